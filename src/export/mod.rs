//! ボード画像の書き出し
//!
//! 1. 写真が1枚もなければ中止
//! 2. ラスタ描画面に全マスを合成
//! 3. JPEG/PNG にエンコードして保存

pub mod decode;
pub mod raster;

use crate::config::Config;
use crate::error::{BingoError, Result};
use chrono::NaiveDate;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbaImage};
use ab_glyph::FontVec;
use photo_bingo_common::{
    composite_allowed, Board, CellRenderer, CompositeObserver, CompositeResult, Compositor, BOARD_CELLS,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use decode::ImageDecoder;
pub use raster::{bundled_font, load_font, DecodedPhoto, RasterSurface};

/// 出力ファイル名の接頭辞
pub const FILE_PREFIX: &str = "kollegen-bingo";

/// 出力形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "png" => Ok(ExportFormat::Png),
            _ => Err(format!("Unknown format: {}. Use jpeg or png", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Jpeg => write!(f, "jpeg"),
            ExportFormat::Png => write!(f, "png"),
        }
    }
}

/// `kollegen-bingo-YYYY-MM-DD.jpg`
pub fn output_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!("{}-{}.{}", FILE_PREFIX, date.format("%Y-%m-%d"), format.extension())
}

/// 出力先がディレクトリならファイル名を付ける
fn output_path_for(output: &Path, date: NaiveDate, format: ExportFormat) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(output_file_name(date, format))
    } else {
        output.to_path_buf()
    }
}

/// 合成済み画像をファイルに保存
pub fn export_image(canvas: &RgbaImage, path: &Path, format: ExportFormat, jpeg_quality: u8) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoded = match format {
        ExportFormat::Jpeg => {
            // JPEG はアルファなし
            let rgb = image::DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, jpeg_quality.clamp(1, 100)).encode_image(&rgb)
        }
        ExportFormat::Png => canvas.write_to(&mut writer, ImageFormat::Png),
    };
    encoded.map_err(|e| BingoError::Export(format!("{}: {}", path.display(), e)))?;

    info!(path = %path.display(), %format, "board image written");
    Ok(())
}

/// 使うフォントを決める
///
/// 明示指定のフォントが読めなければエラー。指定がなければシステムの候補、
/// それもなければ同梱フォント。
pub fn font_from_config(config: &Config) -> Result<FontVec> {
    if let Some(path) = &config.font_path {
        return load_font(path);
    }

    if let Some(path) = config.system_font_path() {
        match load_font(&path) {
            Ok(font) => {
                debug!(path = %path.display(), "using system font");
                return Ok(font);
            }
            Err(e) => warn!(error = %e, "system font could not be loaded, using bundled font"),
        }
    }

    debug!("using bundled font");
    bundled_font()
}

pub fn surface_from_config(config: &Config) -> Result<RasterSurface> {
    Ok(RasterSurface::new(font_from_config(config)?))
}

/// 設定のレイアウト・スタイルで合成器を作る
pub fn compositor_from_config(config: &Config) -> Result<Compositor> {
    if config.layout.cell_count() != BOARD_CELLS {
        return Err(BingoError::Config(format!(
            "グリッドは{}x{}のみ対応しています: {}",
            photo_bingo_common::GRID_SIZE,
            photo_bingo_common::GRID_SIZE,
            config.layout.grid_size
        )));
    }
    Ok(Compositor::new(config.layout, CellRenderer::new(config.cell_style())))
}

/// ボードを描画面に合成（写真が1枚もなければエラー）
pub async fn render_board<O: CompositeObserver>(
    board: &Board,
    compositor: &Compositor,
    decoder: &ImageDecoder,
    surface: &mut RasterSurface,
    observer: &mut O,
) -> Result<CompositeResult> {
    if !composite_allowed(board) {
        return Err(BingoError::NothingToComposite);
    }

    Ok(compositor.composite(board, decoder, surface, observer).await)
}

/// 書き出し結果
#[derive(Debug, Clone)]
pub struct FinalizeReport {
    pub path: PathBuf,
    pub result: CompositeResult,
}

/// 合成して保存まで
pub async fn finalize<O: CompositeObserver>(
    board: &Board,
    config: &Config,
    output: &Path,
    format: ExportFormat,
    date: NaiveDate,
    observer: &mut O,
) -> Result<FinalizeReport> {
    let compositor = compositor_from_config(config)?;
    let decoder = ImageDecoder::new(config.decode_timeout(), config.max_concurrent_decodes);
    let mut surface = surface_from_config(config)?;

    let result = render_board(board, &compositor, &decoder, &mut surface, observer).await?;

    let path = output_path_for(output, date, format);
    export_image(surface.canvas(), &path, format, config.jpeg_quality)?;

    Ok(FinalizeReport { path, result })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(output_file_name(date, ExportFormat::Jpeg), "kollegen-bingo-2024-03-07.jpg");
        assert_eq!(output_file_name(date, ExportFormat::Png), "kollegen-bingo-2024-03-07.png");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_output_path_for_explicit_file() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let path = output_path_for(Path::new("/tmp/out/board.png"), date, ExportFormat::Png);
        assert_eq!(path, PathBuf::from("/tmp/out/board.png"));

        let dir = output_path_for(Path::new("/tmp/nonexistent-bingo-dir"), date, ExportFormat::Jpeg);
        assert_eq!(dir, PathBuf::from("/tmp/nonexistent-bingo-dir/kollegen-bingo-2024-01-01.jpg"));
    }

    #[test]
    fn test_explicit_font_must_load() {
        let config = Config {
            font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..Default::default()
        };
        assert!(matches!(font_from_config(&config), Err(BingoError::Font(_))));
    }

    #[test]
    fn test_font_always_resolved_without_config() {
        assert!(font_from_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_compositor_rejects_other_grid() {
        let mut config = Config::default();
        config.layout.grid_size = 4;
        assert!(matches!(compositor_from_config(&config), Err(BingoError::Config(_))));

        config.layout.grid_size = 5;
        assert!(compositor_from_config(&config).is_ok());
    }
}
