//! 描画面の抽象
//!
//! 合成パイプラインはこのトレイト越しにだけ描画する。
//! 実装はCLI側のラスタ描画面（RGBAバッファ）など。

use crate::geometry::Rect;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// RGBA色（アルファは 0-255）
///
/// JSONでは `#rrggbb`（不透明）/ `#rrggbbaa` の文字列。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 不透明度（0.0-1.0）を指定して作成
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// `#rrggbb` / `#rrggbbaa` をパース
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xff
    }

    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {}", hex)))
    }
}

/// 水平方向の揃え
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// デコード済み画像のサイズ
pub trait ImageSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// 描画面
///
/// テキストの `y` は行の縦中央（canvas の `textBaseline = "middle"` 相当）。
pub trait Surface {
    type Image: ImageSource;

    fn size(&self) -> (u32, u32);

    /// サイズを変えて全面を塗りつぶす
    fn reset(&mut self, width: u32, height: u32, background: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// 枠線（線幅の中心が矩形の辺に乗る）
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);

    /// 画像の `src` 範囲を `dest` に拡縮して描画。`dest` の外には描かない。
    fn draw_image_region(&mut self, image: &Self::Image, src: Rect, dest: Rect);

    fn measure_text(&self, text: &str, font_size: f32) -> f32;

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color, align: TextAlign);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#2563b8"), Some(Color::rgb(0x25, 0x63, 0xb8)));
        assert_eq!(Color::from_hex("000000bf"), Some(Color::rgba(0, 0, 0, 0xbf)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_color_json_is_hex() {
        let band = Color::BLACK.with_opacity(0.75);
        assert_eq!(serde_json::to_string(&band).unwrap(), r##""#000000bf""##);
        assert_eq!(serde_json::to_string(&Color::WHITE).unwrap(), r##""#ffffff""##);
        assert_eq!(serde_json::from_str::<Color>(r##""#2563b8""##).unwrap(), Color::rgb(0x25, 0x63, 0xb8));
        assert!(serde_json::from_str::<Color>(r#""blue""#).is_err());
    }

    #[test]
    fn test_color_opacity() {
        let band = Color::BLACK.with_opacity(0.75);
        assert_eq!(band.a, 191);
        assert!(!band.is_opaque());
        assert!(Color::WHITE.is_opaque());
    }
}
