//! 撮影デバイス
//!
//! カメラは「向きごとの撮影フォルダ」として扱う。フレームはそのフォルダの最新画像。
//! 指定した向きが使えないときは、もう一方の向きで開き直す。

mod orientation;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use photo_bingo_common::Photo;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

/// カメラの向き
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// 背面（environment）
    #[default]
    Back,
    /// 前面（user）
    Front,
}

impl Facing {
    pub fn other(self) -> Self {
        match self {
            Facing::Back => Facing::Front,
            Facing::Front => Facing::Back,
        }
    }
}

impl std::str::FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "back" | "environment" | "rear" => Ok(Facing::Back),
            "front" | "user" | "selfie" => Ok(Facing::Front),
            _ => Err(format!("Unknown facing: {}. Use back or front", s)),
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Back => write!(f, "back"),
            Facing::Front => write!(f, "front"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("{0}カメラが設定されていません")]
    NotConfigured(Facing),

    #[error("カメラにアクセスできません: {0}")]
    Unavailable(String),

    #[error("撮影された画像がありません: {0}")]
    NoFrame(String),

    #[error("画像を読み込めません: {0}")]
    Unreadable(String),
}

/// 保存する写真のエンコード設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoEncoding {
    /// JPEG品質
    pub quality: u8,
    /// 長辺の上限（px）。これより大きいフレームは縮小する
    pub max_edge: u32,
}

impl Default for PhotoEncoding {
    fn default() -> Self {
        Self {
            quality: 80,
            max_edge: 1600,
        }
    }
}

/// 撮影した1フレーム
#[derive(Debug, Clone)]
pub struct ImageFrame {
    pub image: DynamicImage,
    pub source: Option<PathBuf>,
}

impl ImageFrame {
    /// 画像ファイルから読み込み（EXIFの向きを反映）
    pub fn from_path(path: &Path) -> Result<Self, CaptureError> {
        let unreadable = |e: &dyn fmt::Display| CaptureError::Unreadable(format!("{}: {}", path.display(), e));

        let image = ImageReader::open(path)
            .map_err(|e| unreadable(&e))?
            .with_guessed_format()
            .map_err(|e| unreadable(&e))?
            .decode()
            .map_err(|e| unreadable(&e))?;

        let image = match orientation::extract_orientation(path) {
            Ok(orientation) => apply_orientation(image, orientation),
            Err(_) => image,
        };

        Ok(Self {
            image,
            source: Some(path.to_path_buf()),
        })
    }

    /// マスに保存する写真（JPEG）に変換。長辺が上限を超えていれば縮小する
    pub fn to_photo(&self, encoding: &PhotoEncoding) -> crate::error::Result<Photo> {
        let max_edge = encoding.max_edge.max(1);
        let rgb = if self.image.width() > max_edge || self.image.height() > max_edge {
            debug!(width = self.image.width(), height = self.image.height(), max_edge, "downscaling frame");
            self.image.resize(max_edge, max_edge, FilterType::Triangle).to_rgb8()
        } else {
            self.image.to_rgb8()
        };

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, encoding.quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| crate::error::BingoError::PhotoEncode(e.to_string()))?;
        Ok(Photo::jpeg(bytes))
    }
}

/// EXIF Orientation を画素に反映
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// 撮影デバイス
pub trait CaptureDevice {
    /// 指定の向きで開いてフレームを取る
    fn open(&mut self, facing: Facing) -> Result<ImageFrame, CaptureError>;

    /// 向きを切り替えてフレームを取り直す
    fn switch_facing(&mut self) -> Result<ImageFrame, CaptureError>;

    fn close(&mut self);

    /// 開いている向き
    fn active_facing(&self) -> Option<Facing>;
}

/// 撮影フォルダをカメラとして扱うデバイス
#[derive(Debug, Clone, Default)]
pub struct FolderCamera {
    back_dir: Option<PathBuf>,
    front_dir: Option<PathBuf>,
    active: Option<Facing>,
}

impl FolderCamera {
    pub fn new(back_dir: Option<PathBuf>, front_dir: Option<PathBuf>) -> Self {
        Self {
            back_dir,
            front_dir,
            active: None,
        }
    }

    fn dir_for(&self, facing: Facing) -> Option<&Path> {
        match facing {
            Facing::Back => self.back_dir.as_deref(),
            Facing::Front => self.front_dir.as_deref(),
        }
    }

    fn grab(&self, facing: Facing) -> Result<ImageFrame, CaptureError> {
        let dir = self.dir_for(facing).ok_or(CaptureError::NotConfigured(facing))?;
        if !dir.is_dir() {
            return Err(CaptureError::Unavailable(dir.display().to_string()));
        }

        let newest = latest_image(dir).ok_or_else(|| CaptureError::NoFrame(dir.display().to_string()))?;
        debug!(%facing, path = %newest.display(), "frame grabbed");
        ImageFrame::from_path(&newest)
    }
}

impl CaptureDevice for FolderCamera {
    fn open(&mut self, facing: Facing) -> Result<ImageFrame, CaptureError> {
        self.close();

        match self.grab(facing) {
            Ok(frame) => {
                self.active = Some(facing);
                Ok(frame)
            }
            Err(first) => {
                // 指定の向きが使えなければ、もう一方で開く
                warn!(%facing, error = %first, "camera unavailable, trying fallback");
                let fallback = facing.other();
                match self.grab(fallback) {
                    Ok(frame) => {
                        self.active = Some(fallback);
                        Ok(frame)
                    }
                    Err(_) => Err(first),
                }
            }
        }
    }

    fn switch_facing(&mut self) -> Result<ImageFrame, CaptureError> {
        let next = self.active.unwrap_or_default().other();
        self.open(next)
    }

    fn close(&mut self) {
        self.active = None;
    }

    fn active_facing(&self) -> Option<Facing> {
        self.active
    }
}

/// フォルダ直下の最新画像（更新日時順）
fn latest_image(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1) // 直下のみ
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, e.into_path()))
        })
        .max()
        .map(|(_, path)| path)
}

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}
