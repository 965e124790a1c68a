use crate::capture::PhotoEncoding;
use crate::error::{BingoError, Result};
use photo_bingo_common::{CellStyle, ConfirmPolicy, Layout, TextMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "photo-bingo";
const BOARD_FILE_NAME: &str = "board.json";

/// フォント未設定時に探す候補（太字サンセリフ）
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ボード保存先（省略時はデータディレクトリ）
    pub store_path: Option<PathBuf>,
    /// 合成画像の出力先（省略時はカレント）
    pub output_dir: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    /// 背面カメラの撮影フォルダ
    pub capture_back_dir: Option<PathBuf>,
    /// 前面カメラの撮影フォルダ
    pub capture_front_dir: Option<PathBuf>,
    pub decode_timeout_seconds: u64,
    /// 撮影写真の保存品質
    pub photo_quality: u8,
    /// 撮影写真の長辺の上限（px）
    pub max_photo_edge: u32,
    /// 同時にデコードする写真の数
    pub max_concurrent_decodes: usize,
    /// 合成画像(JPEG)の品質
    pub jpeg_quality: u8,
    pub empty_cell_text: TextMode,
    pub confirm: ConfirmPolicy,
    /// ボードのグリッド寸法
    pub layout: Layout,
    /// セルの配色・フォントサイズ（色は `#rrggbb` / `#rrggbbaa`）
    pub style: CellStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BingoError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join(APP_DIR).join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            store_path: None,
            output_dir: None,
            font_path: None,
            capture_back_dir: None,
            capture_front_dir: None,
            decode_timeout_seconds: 10,
            photo_quality: 80,
            max_photo_edge: 1600,
            max_concurrent_decodes: 4,
            jpeg_quality: 90,
            empty_cell_text: TextMode::Wrap,
            confirm: ConfirmPolicy::WhenPartial,
            layout: Layout::default(),
            style: CellStyle::default(),
        }
    }

    /// ボード保存先
    pub fn board_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }

        let data = dirs::data_dir()
            .ok_or_else(|| BingoError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join(APP_DIR).join(BOARD_FILE_NAME))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_secs(self.decode_timeout_seconds.max(1))
    }

    pub fn photo_encoding(&self) -> PhotoEncoding {
        PhotoEncoding {
            quality: self.photo_quality,
            max_edge: self.max_photo_edge,
        }
    }

    /// 描画スタイル（未撮影マスの文字モードは `empty_cell_text` が優先）
    pub fn cell_style(&self) -> CellStyle {
        CellStyle {
            empty_text_mode: self.empty_cell_text,
            ..self.style.clone()
        }
    }

    /// 既定の候補のうち、存在する最初のシステムフォント
    pub fn system_font_path(&self) -> Option<PathBuf> {
        FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
    }

    pub fn set_font_path(&mut self, path: PathBuf) -> Result<()> {
        if !path.is_file() {
            return Err(BingoError::Config(format!(
                "フォントファイルが見つかりません: {}",
                path.display()
            )));
        }
        self.font_path = Some(path);
        Ok(())
    }

    pub fn set_capture_dir(&mut self, front: bool, dir: PathBuf) -> Result<()> {
        if !dir.is_dir() {
            return Err(BingoError::Config(format!(
                "フォルダが見つかりません: {}",
                dir.display()
            )));
        }
        if front {
            self.capture_front_dir = Some(dir);
        } else {
            self.capture_back_dir = Some(dir);
        }
        Ok(())
    }
}
