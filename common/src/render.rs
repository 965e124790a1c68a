//! セル描画
//!
//! 1マス分（背景・写真・キャプション帯・質問テキスト）を描画面に描く。
//! 写真のデコード（非同期）と描画（同期、`&mut Surface` が必要）は分けてある。

use crate::board::{Cell, Photo};
use crate::error::CellError;
use crate::geometry::{cover_fit, Rect};
use crate::surface::{Color, ImageSource, Surface, TextAlign};
use crate::text_fit::{self, FitResult, TextMode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// フォントサイズの上限・下限
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontBounds {
    pub start: f32,
    pub min: f32,
}

/// セルの見た目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellStyle {
    /// ボード全体の背景
    pub board_background: Color,
    /// 未撮影マスの背景
    pub empty_fill: Color,
    /// 未撮影マスの枠線（None で枠なし）
    pub empty_border: Option<Color>,
    pub border_width: f32,
    /// 写真の下地
    pub photo_backdrop: Color,
    /// キャプション帯（半透明）
    pub caption_band: Color,
    pub caption_band_height: f32,
    pub caption_text: Color,
    pub caption_font: FontBounds,
    /// キャプション帯の左右余白の合計
    pub caption_padding: f32,
    /// 未撮影マスの質問テキスト
    pub prompt_text: Color,
    pub empty_font: FontBounds,
    pub empty_padding: f32,
    pub empty_text_mode: TextMode,
    /// 行間（フォントサイズ比）
    pub line_height: f32,
    /// 読み込み失敗マスの塗り
    pub failed_fill: Color,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            board_background: Color::rgb(0x25, 0x63, 0xb8),
            empty_fill: Color::rgb(0xf8, 0xf9, 0xfa),
            empty_border: Some(Color::rgb(0xde, 0xe2, 0xe6)),
            border_width: 2.0,
            photo_backdrop: Color::WHITE,
            caption_band: Color::BLACK.with_opacity(0.75),
            caption_band_height: 55.0,
            caption_text: Color::WHITE,
            caption_font: FontBounds { start: 26.0, min: 14.0 },
            caption_padding: 30.0,
            prompt_text: Color::rgb(0x25, 0x63, 0xb8),
            empty_font: FontBounds { start: 34.0, min: 14.0 },
            empty_padding: 50.0,
            empty_text_mode: TextMode::Wrap,
            line_height: 1.2,
            failed_fill: Color::rgb(0xe9, 0xec, 0xef),
        }
    }
}

/// 1マスの描画結果（全マスで必ず1回だけ生成される）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    pub cell_index: usize,
    pub success: bool,
    /// 写真付きマスとして描画されたか
    pub with_photo: bool,
}

/// 描画前に解決したセルの中身
#[derive(Debug)]
pub enum CellContent<I> {
    Empty,
    Photo(I),
    Failed(CellError),
}

/// 写真デコーダ
///
/// 各デコードは独立した非同期処理。完了順は保証されない。
pub trait PhotoDecoder {
    type Image: ImageSource;

    fn decode(&self, cell_index: usize, photo: &Photo) -> impl Future<Output = Result<Self::Image, CellError>>;
}

/// セル描画
#[derive(Debug, Clone, Default)]
pub struct CellRenderer {
    style: CellStyle,
}

impl CellRenderer {
    pub fn new(style: CellStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &CellStyle {
        &self.style
    }

    /// セルの中身を解決（写真付きマスだけデコードで待つ）
    pub async fn resolve<D: PhotoDecoder>(&self, index: usize, cell: &Cell, decoder: &D) -> CellContent<D::Image> {
        match cell.photo_to_render() {
            Some(photo) => match decoder.decode(index, photo).await {
                Ok(image) => CellContent::Photo(image),
                Err(e) => CellContent::Failed(e),
            },
            None => CellContent::Empty,
        }
    }

    /// 1マスを描画
    pub fn render_cell<S: Surface>(
        &self,
        surface: &mut S,
        index: usize,
        rect: Rect,
        cell: &Cell,
        content: CellContent<S::Image>,
    ) -> RenderOutcome {
        let with_photo = cell.photo_to_render().is_some();

        let result = match content {
            CellContent::Photo(image) if with_photo => self.draw_photo_cell(surface, rect, cell, &image),
            CellContent::Failed(e) if with_photo => Err(e),
            _ => {
                self.draw_empty_cell(surface, rect, cell);
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                debug!(cell = index, with_photo, "cell rendered");
                RenderOutcome {
                    cell_index: index,
                    success: true,
                    with_photo,
                }
            }
            Err(e) => {
                warn!(cell = index, error = %e, "cell render failed, using fallback fill");
                surface.fill_rect(rect, self.style.failed_fill);
                RenderOutcome {
                    cell_index: index,
                    success: false,
                    with_photo,
                }
            }
        }
    }

    fn draw_empty_cell<S: Surface>(&self, surface: &mut S, rect: Rect, cell: &Cell) {
        let style = &self.style;

        surface.fill_rect(rect, style.empty_fill);
        if let Some(border) = style.empty_border {
            surface.stroke_rect(rect, border, style.border_width);
        }

        // 写真と競合しないので大きめのフォント
        let max_width = rect.width - style.empty_padding;
        let max_height = rect.height - style.empty_padding;
        let fit = text_fit::fit(
            &cell.prompt,
            max_width,
            max_height,
            style.empty_font.start,
            style.empty_font.min,
            style.empty_text_mode,
            style.line_height,
            |text, size| surface.measure_text(text, size),
        );

        match fit {
            FitResult::SingleLine { font_size } => {
                surface.draw_text(
                    &cell.prompt,
                    rect.center_x(),
                    rect.center_y(),
                    font_size,
                    style.prompt_text,
                    TextAlign::Center,
                );
            }
            FitResult::Wrapped { font_size, lines } => {
                let line_height = font_size * style.line_height;
                let mut y = text_fit::first_line_center_y(rect.center_y(), lines.len(), line_height);
                for line in &lines {
                    surface.draw_text(line, rect.center_x(), y, font_size, style.prompt_text, TextAlign::Center);
                    y += line_height;
                }
            }
        }
    }

    fn draw_photo_cell<S: Surface>(
        &self,
        surface: &mut S,
        rect: Rect,
        cell: &Cell,
        image: &S::Image,
    ) -> Result<(), CellError> {
        let style = &self.style;
        let (image_width, image_height) = (image.width() as f32, image.height() as f32);
        let fit = cover_fit(image_width, image_height, rect.width, rect.height)?;

        surface.fill_rect(rect, style.photo_backdrop);
        surface.draw_image_region(image, fit.source_region(image_width, image_height), rect);

        let band = rect.top_band(style.caption_band_height);
        surface.fill_rect(band, style.caption_band);

        let font_size = text_fit::fit_single_line(
            &cell.prompt,
            rect.width - style.caption_padding,
            style.caption_font.start,
            style.caption_font.min,
            |text, size| surface.measure_text(text, size),
        )
        .font_size();

        surface.draw_text(
            &cell.prompt,
            band.center_x(),
            band.center_y(),
            font_size,
            style.caption_text,
            TextAlign::Center,
        );

        Ok(())
    }
}
