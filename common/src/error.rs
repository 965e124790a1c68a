//! エラー型定義

use std::time::Duration;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Board size error: expected {expected} cells, got {actual}")]
    BoardSize { expected: usize, actual: usize },

    #[error("Cell order error: cell at index {index} has id {id}")]
    CellOrder { index: usize, id: usize },

    #[error("Empty prompt at cell {0}")]
    EmptyPrompt(usize),

    #[error("Cell index out of range: {index} (board has {len} cells)")]
    CellIndex { index: usize, len: usize },

    #[error("Photo data error: {0}")]
    PhotoData(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// セル単位の描画エラー
///
/// 合成全体は止めず、該当セルだけ失敗として扱う。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    #[error("photo decode failed: {0}")]
    Decode(String),

    #[error("photo decode timed out after {0:?}")]
    Timeout(Duration),

    #[error("degenerate image geometry: {width}x{height}")]
    DegenerateGeometry { width: f32, height: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_board_size() {
        let error = Error::BoardSize { expected: 25, actual: 24 };
        assert_eq!(
            error.to_string(),
            "Board size error: expected 25 cells, got 24"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_cell_error_display() {
        let error = CellError::DegenerateGeometry { width: 0.0, height: 120.0 };
        assert!(error.to_string().contains("0x120"));

        let error = CellError::Timeout(Duration::from_secs(3));
        assert!(error.to_string().contains("3s"));
    }
}
