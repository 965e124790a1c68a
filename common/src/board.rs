//! ボードモデル
//!
//! 5×5 = 25マスの固定長ボード。セルの並びは生成時に決まり、以後並び替えない。
//! 永続化フォーマット（JSON）では質問を `question` フィールドに持つ。

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::warn;

/// 1辺のマス数
pub const GRID_SIZE: usize = 5;

/// ボードのマス数
pub const BOARD_CELLS: usize = GRID_SIZE * GRID_SIZE;

const DEFAULT_MIME: &str = "image/jpeg";

/// エンコード済み画像（撮影時点のJPEGなど）
///
/// JSONには `data:image/jpeg;base64,...` 形式で保存される。
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    mime: String,
    bytes: Vec<u8>,
}

impl Photo {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(DEFAULT_MIME, bytes)
    }

    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// data URL をパース
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::PhotoData("missing data: prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::PhotoData("missing payload separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::PhotoData(format!("unsupported encoding: {}", header)))?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| Error::PhotoData(e.to_string()))?;

        let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
        Ok(Self::new(mime, bytes))
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Serialize for Photo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for Photo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        Photo::from_data_url(&url).map_err(serde::de::Error::custom)
    }
}

/// ボードの1マス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: usize,

    #[serde(rename = "question")]
    pub prompt: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub photo: Option<Photo>,
}

impl Cell {
    pub fn new(id: usize, prompt: impl Into<String>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            completed: false,
            photo: None,
        }
    }

    /// 写真を付ける（再撮影は上書き、completed は true のまま）
    pub fn attach_photo(&mut self, photo: Photo) {
        self.photo = Some(photo);
        self.completed = true;
    }

    /// 写真を描画すべきセルか
    pub fn photo_to_render(&self) -> Option<&Photo> {
        if self.completed {
            self.photo.as_ref()
        } else {
            None
        }
    }
}

/// 25マスのボード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// 質問リストから新しいボードを作成（全マス未完了）
    pub fn from_prompts<I, S>(prompts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells = prompts
            .into_iter()
            .enumerate()
            .map(|(i, p)| Cell::new(i, p))
            .collect();
        Self::from_cells(cells)
    }

    /// 既存セルからボードを復元
    ///
    /// 長さが25でない、id が位置と一致しない、質問が空の場合はエラー。
    /// `completed` と写真の有無が食い違うマスは未撮影に戻す。
    pub fn from_cells(mut cells: Vec<Cell>) -> Result<Self> {
        if cells.len() != BOARD_CELLS {
            return Err(Error::BoardSize {
                expected: BOARD_CELLS,
                actual: cells.len(),
            });
        }

        for (index, cell) in cells.iter().enumerate() {
            if cell.id != index {
                return Err(Error::CellOrder { index, id: cell.id });
            }
            if cell.prompt.trim().is_empty() {
                return Err(Error::EmptyPrompt(index));
            }
        }

        for cell in cells.iter_mut() {
            if cell.completed != cell.photo.is_some() {
                warn!(
                    cell = cell.id,
                    completed = cell.completed,
                    has_photo = cell.photo.is_some(),
                    "inconsistent cell reset to not captured"
                );
                cell.completed = false;
                cell.photo = None;
            }
        }

        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 指定マスに写真を付ける
    pub fn attach_photo(&mut self, index: usize, photo: Photo) -> Result<&Cell> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(Error::CellIndex { index, len })?;
        cell.attach_photo(photo);
        Ok(cell)
    }

    /// 写真付きのマス数
    pub fn completed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.completed).count()
    }

    pub fn is_full(&self) -> bool {
        self.completed_count() == self.cells.len()
    }
}

impl TryFrom<Vec<Cell>> for Board {
    type Error = Error;

    fn try_from(cells: Vec<Cell>) -> Result<Self> {
        Self::from_cells(cells)
    }
}

impl From<Board> for Vec<Cell> {
    fn from(board: Board) -> Self {
        board.cells
    }
}
