//! RGBAバッファへの描画面
//!
//! テキストは ab_glyph + imageproc で描く。フォントは必須で、
//! 設定もシステムフォントもなければ同梱の DejaVu Sans Bold を使う。

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use photo_bingo_common::{Color, ImageSource, Rect, Surface, TextAlign};
use std::path::Path;

use crate::error::{BingoError, Result};

/// 同梱フォント（Bitstream Vera ライセンス、assets/LICENSE-DejaVu.txt）
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans-Bold.ttf");

/// デコード済みの写真
#[derive(Debug, Clone)]
pub struct DecodedPhoto(pub RgbaImage);

impl ImageSource for DecodedPhoto {
    fn width(&self) -> u32 {
        self.0.width()
    }

    fn height(&self) -> u32 {
        self.0.height()
    }
}

/// TTF/OTF を読み込む
pub fn load_font(path: &Path) -> Result<FontVec> {
    let data = std::fs::read(path).map_err(|e| BingoError::Font(format!("{}: {}", path.display(), e)))?;
    FontVec::try_from_vec(data).map_err(|e| BingoError::Font(format!("{}: {}", path.display(), e)))
}

/// 同梱フォント
pub fn bundled_font() -> Result<FontVec> {
    FontVec::try_from_vec(BUNDLED_FONT.to_vec()).map_err(|e| BingoError::Font(format!("bundled: {}", e)))
}

pub struct RasterSurface {
    canvas: RgbaImage,
    font: FontVec,
}

impl RasterSurface {
    pub fn new(font: FontVec) -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            font,
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// 矩形をピクセル範囲に丸めてキャンバス内に切り詰める
    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = (self.canvas.width() as f32, self.canvas.height() as f32);
        let x0 = rect.x.round().clamp(0.0, w);
        let y0 = rect.y.round().clamp(0.0, h);
        let x1 = rect.right().round().clamp(0.0, w);
        let y1 = rect.bottom().round().clamp(0.0, h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

impl Surface for RasterSurface {
    type Image = DecodedPhoto;

    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn reset(&mut self, width: u32, height: u32, background: Color) {
        self.canvas = RgbaImage::from_pixel(width, height, to_rgba(background));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        let paint = to_rgba(color);

        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = self.canvas.get_pixel_mut(x, y);
                if color.is_opaque() {
                    *pixel = paint;
                } else {
                    pixel.blend(&paint);
                }
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        if line_width <= 0.0 {
            return;
        }
        let half = line_width / 2.0;
        let inner_height = (rect.height - line_width).max(0.0);

        // 上下の帯は角まで、左右の帯はその間だけ（角を二重に塗らない）
        self.fill_rect(Rect::new(rect.x - half, rect.y - half, rect.width + line_width, line_width), color);
        self.fill_rect(
            Rect::new(rect.x - half, rect.bottom() - half, rect.width + line_width, line_width),
            color,
        );
        self.fill_rect(Rect::new(rect.x - half, rect.y + half, line_width, inner_height), color);
        self.fill_rect(Rect::new(rect.right() - half, rect.y + half, line_width, inner_height), color);
    }

    fn draw_image_region(&mut self, image: &DecodedPhoto, src: Rect, dest: Rect) {
        let (img_w, img_h) = image.0.dimensions();
        let sx = src.x.round().clamp(0.0, img_w as f32) as u32;
        let sy = src.y.round().clamp(0.0, img_h as f32) as u32;
        let sw = (src.width.round() as u32).min(img_w - sx);
        let sh = (src.height.round() as u32).min(img_h - sy);

        let dx = dest.x.round() as i64;
        let dy = dest.y.round() as i64;
        let dw = (dest.right().round() as i64 - dx).max(0) as u32;
        let dh = (dest.bottom().round() as i64 - dy).max(0) as u32;

        if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
            return;
        }

        let region = imageops::crop_imm(&image.0, sx, sy, sw, sh).to_image();
        let scaled = imageops::resize(&region, dw, dh, FilterType::Triangle);
        imageops::overlay(&mut self.canvas, &scaled, dx, dy);
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_size));
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let glyph = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, glyph);
            }
            width += scaled.h_advance(glyph);
            previous = Some(glyph);
        }
        width
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color, align: TextAlign) {
        let width = self.measure_text(text, font_size);
        let scale = PxScale::from(font_size);
        let scaled = self.font.as_scaled(scale);
        // y は行の縦中央、imageproc の y は行の上端
        let top = y - (scaled.ascent() - scaled.descent()) / 2.0;
        let left = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };

        draw_text_mut(
            &mut self.canvas,
            to_rgba(color),
            left.round() as i32,
            top.round() as i32,
            scale,
            &self.font,
            text,
        );
    }
}
