//! ボード保存モジュール
//!
//! ボードをJSONファイルに保存・復元する。写真は data URL で埋め込む。
//! 読み込みに失敗したとき、25マスでないボードを返すことはない。

use crate::error::{BingoError, Result};
use photo_bingo_common::{Board, Cell, ALL_PROMPTS};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// ボードの永続化
pub trait BoardStore {
    /// 保存済みボード、なければ新しいボード（質問はシャッフル）
    fn load(&mut self) -> Result<Board>;

    /// マスの更新ごとに呼ばれる
    fn save(&mut self, board: &Board) -> Result<()>;

    /// 保存データを消す
    fn reset(&mut self) -> Result<()>;
}

/// 保存ファイルの構造
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    cells: Vec<Cell>,
}

/// JSONファイルによるボード保存
#[derive(Debug, Clone)]
pub struct JsonBoardStore {
    path: PathBuf,
}

impl JsonBoardStore {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn persistence_error(&self, e: impl std::fmt::Display) -> BingoError {
        BingoError::Persistence(format!("{}: {}", self.path.display(), e))
    }

    fn read(&self) -> Result<Board> {
        let file = File::open(&self.path).map_err(|e| self.persistence_error(e))?;
        let reader = BufReader::new(file);
        let stored: StoreFile = serde_json::from_reader(reader).map_err(|e| self.persistence_error(e))?;

        if stored.version != Self::CURRENT_VERSION {
            return Err(BingoError::IncompatibleStore {
                found: stored.version,
                supported: Self::CURRENT_VERSION,
            });
        }

        Board::from_cells(stored.cells).map_err(|e| self.persistence_error(e))
    }
}

/// 質問をシャッフルした新しいボード
pub fn new_shuffled_board() -> Result<Board> {
    let mut prompts = ALL_PROMPTS.to_vec();
    prompts.shuffle(&mut rand::thread_rng());
    Ok(Board::from_prompts(prompts)?)
}

impl BoardStore for JsonBoardStore {
    fn load(&mut self) -> Result<Board> {
        if self.exists() {
            let board = self.read()?;
            debug!(path = %self.path.display(), completed = board.completed_count(), "board loaded");
            return Ok(board);
        }

        let board = new_shuffled_board()?;
        self.save(&board)?;
        info!(path = %self.path.display(), "new board created");
        Ok(board)
    }

    fn save(&mut self, board: &Board) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
        }

        let stored = StoreFile {
            version: Self::CURRENT_VERSION,
            cells: board.cells().to_vec(),
        };

        // 書きかけのファイルを残さないよう一時ファイル経由で置き換える
        let tmp_path = self.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &stored)?;
            writer.flush()?;
            std::fs::rename(&tmp_path, &self.path)
        };
        write().map_err(|e| self.persistence_error(e))?;

        debug!(path = %self.path.display(), completed = board.completed_count(), "board saved");
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        if self.exists() {
            std::fs::remove_file(&self.path).map_err(|e| self.persistence_error(e))?;
            info!(path = %self.path.display(), "board reset");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_bingo_common::Photo;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn test_first_load_creates_and_persists() {
        let dir = tempdir().unwrap();
        let mut store = JsonBoardStore::new(dir.path().join("board.json"));

        let board = store.load().unwrap();
        assert!(store.exists());
        assert_eq!(board.len(), 25);

        let prompts: HashSet<&str> = board.cells().iter().map(|c| c.prompt.as_str()).collect();
        let expected: HashSet<&str> = ALL_PROMPTS.iter().copied().collect();
        assert_eq!(prompts, expected);

        // 2回目は同じ並びが返る
        let again = store.load().unwrap();
        assert_eq!(again, board);
    }

    #[test]
    fn test_save_roundtrip_with_photo() {
        let dir = tempdir().unwrap();
        let mut store = JsonBoardStore::new(dir.path().join("board.json"));

        let mut board = store.load().unwrap();
        board.attach_photo(4, Photo::jpeg(vec![0xff, 0xd8, 0xff, 0xe0])).unwrap();
        store.save(&board).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.completed_count(), 1);
        assert_eq!(loaded.cell(4).unwrap().photo.as_ref().unwrap().bytes(), &[0xff, 0xd8, 0xff, 0xe0]);
        assert!(!dir.path().join("board.json.tmp").exists());
    }

    #[test]
    fn test_reset_removes_file() {
        let dir = tempdir().unwrap();
        let mut store = JsonBoardStore::new(dir.path().join("board.json"));
        store.load().unwrap();

        store.reset().unwrap();
        assert!(!store.exists());
        // 何もない状態での reset はエラーにしない
        store.reset().unwrap();
    }
}
