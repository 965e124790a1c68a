use crate::capture::CaptureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BingoError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ボードの保存データを扱えません: {0}")]
    Persistence(String),

    #[error("保存データのバージョン {found} は未対応です（対応: {supported}）。`photo-bingo reset` で作り直してください")]
    IncompatibleStore { found: u32, supported: u32 },

    #[error("マス番号が範囲外です: {0}（1〜25）")]
    CellOutOfRange(usize),

    #[error("カメラエラー: {0}")]
    Capture(#[from] CaptureError),

    #[error("写真のエンコードに失敗: {0}")]
    PhotoEncode(String),

    #[error("フォント読み込みエラー: {0}")]
    Font(String),

    #[error("画像の書き出しに失敗: {0}")]
    Export(String),

    #[error("写真が1枚もありません。少なくとも1マス撮影してから仕上げてください")]
    NothingToComposite,

    #[error("キャンセルしました")]
    Cancelled,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] photo_bingo_common::Error),
}

pub type Result<T> = std::result::Result<T, BingoError>;
