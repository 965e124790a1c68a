//! Photo Bingo Common Library
//!
//! ボードモデルと合成パイプライン（ランタイム非依存）:
//! - board: 25マスのボード
//! - geometry: セル配置・coverトリミング
//! - text_fit: フォントサイズ探索・折り返し
//! - render: 1マスの描画
//! - composite: 全マスの合成とファンインバリア

pub mod board;
pub mod composite;
pub mod error;
pub mod geometry;
pub mod prompts;
pub mod render;
pub mod surface;
pub mod text_fit;

pub use board::{Board, Cell, Photo, BOARD_CELLS, GRID_SIZE};
pub use composite::{composite_allowed, CompositeObserver, CompositeResult, Compositor, ConfirmPolicy, FanIn};
pub use error::{CellError, Error, Result};
pub use geometry::{cell_rect, cover_fit, CellRect, CoverFit, Layout, Rect};
pub use prompts::ALL_PROMPTS;
pub use render::{CellContent, CellRenderer, CellStyle, FontBounds, PhotoDecoder, RenderOutcome};
pub use surface::{Color, ImageSource, Surface, TextAlign};
pub use text_fit::{FitResult, TextMode};
