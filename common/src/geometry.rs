//! ジオメトリ計算
//!
//! セル配置（行・列 → ピクセル矩形）と、CSS `object-fit: cover` 相当のトリミング計算。
//! 状態もI/Oも持たない純粋関数のみ。

use crate::board::GRID_SIZE;
use crate::error::CellError;
use serde::{Deserialize, Serialize};

/// 矩形（px）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// セル矩形
pub type CellRect = Rect;

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// 上端から指定高さの帯
    pub fn top_band(&self, height: f32) -> Self {
        Self::new(self.x, self.y, self.width, height.min(self.height))
    }
}

/// セル矩形を計算
///
/// `index` は `[0, grid_size²)` が前提（範囲外は呼び出し側の契約違反）。
pub fn cell_rect(index: usize, grid_size: usize, cell_size: f32, gap: f32, padding: f32) -> CellRect {
    debug_assert!(index < grid_size * grid_size, "cell index {} out of grid", index);

    let row = index / grid_size;
    let col = index % grid_size;
    let x = padding + col as f32 * (cell_size + gap);
    let y = padding + row as f32 * (cell_size + gap);

    Rect::new(x, y, cell_size, cell_size)
}

/// coverフィットの結果（ボックス左上からの相対座標）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub draw_width: f32,
    pub draw_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl CoverFit {
    /// ボックス内に見える範囲を画像座標で返す
    ///
    /// この範囲だけを描画先ボックスへ転送すれば、はみ出し部分は描かれない。
    pub fn source_region(&self, image_width: f32, image_height: f32) -> Rect {
        let scale = self.draw_width / image_width;
        let box_width = self.draw_width + self.offset_x * 2.0;
        let box_height = self.draw_height + self.offset_y * 2.0;

        Rect::new(
            -self.offset_x / scale,
            -self.offset_y / scale,
            (box_width / scale).min(image_width),
            (box_height / scale).min(image_height),
        )
    }
}

/// アスペクト比を保ったままボックス全体を覆うサイズと中央寄せオフセット
///
/// 幅または高さが0（または非有限）の場合はゼロ除算せずエラーを返す。
pub fn cover_fit(
    image_width: f32,
    image_height: f32,
    box_width: f32,
    box_height: f32,
) -> Result<CoverFit, CellError> {
    let usable = |v: f32| v.is_finite() && v > 0.0;
    if !usable(image_width) || !usable(image_height) {
        return Err(CellError::DegenerateGeometry {
            width: image_width,
            height: image_height,
        });
    }
    if !usable(box_width) || !usable(box_height) {
        return Err(CellError::DegenerateGeometry {
            width: box_width,
            height: box_height,
        });
    }

    let img_aspect = image_width / image_height;
    let box_aspect = box_width / box_height;

    let fit = if img_aspect > box_aspect {
        // 横長: 高さを合わせて左右をトリミング
        let draw_width = image_width * box_height / image_height;
        CoverFit {
            draw_width,
            draw_height: box_height,
            offset_x: (box_width - draw_width) / 2.0,
            offset_y: 0.0,
        }
    } else {
        // 縦長: 幅を合わせて上下をトリミング
        let draw_height = image_height * box_width / image_width;
        CoverFit {
            draw_width: box_width,
            draw_height,
            offset_x: 0.0,
            offset_y: (box_height - draw_height) / 2.0,
        }
    };

    Ok(fit)
}

/// 合成画像のグリッドレイアウト
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub grid_size: usize,
    pub cell_size: f32,
    pub gap: f32,
    pub padding: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            cell_size: 400.0,
            gap: 10.0,
            padding: 20.0,
        }
    }
}

impl Layout {
    /// キャンバス1辺の長さ（px）
    pub fn total_size(&self) -> f32 {
        let n = self.grid_size as f32;
        self.cell_size * n + self.gap * (n - 1.0) + self.padding * 2.0
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn cell_rect(&self, index: usize) -> CellRect {
        cell_rect(index, self.grid_size, self.cell_size, self.gap, self.padding)
    }
}
