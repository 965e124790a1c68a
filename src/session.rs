//! 撮影セッション
//!
//! ボード・保存先・カメラと、いま撮影しているマスを1か所で持つ。

use crate::capture::{CaptureDevice, Facing, ImageFrame, PhotoEncoding};
use crate::error::{BingoError, Result};
use crate::store::{new_shuffled_board, BoardStore};
use photo_bingo_common::{Board, Cell};
use std::path::Path;
use tracing::{debug, info};

/// 撮影元
#[derive(Debug, Clone, Copy)]
pub enum CaptureSource<'a> {
    /// カメラ（指定の向きで開く）
    Device(Facing),
    /// 向きを切り替えて撮る
    SwitchFacing,
    /// 画像ファイルを直接使う
    File(&'a Path),
}

pub struct Session<S: BoardStore, C: CaptureDevice> {
    store: S,
    camera: C,
    board: Board,
    current_cell: Option<usize>,
    encoding: PhotoEncoding,
}

impl<S: BoardStore, C: CaptureDevice> Session<S, C> {
    /// 保存済みボードを読み込んで開始
    pub fn open(mut store: S, camera: C, encoding: PhotoEncoding) -> Result<Self> {
        let board = store.load()?;
        Ok(Self::with_board(store, camera, board, encoding))
    }

    /// 保存データを読まずに消して、質問をシャッフルした新しいボードで開始
    ///
    /// 壊れた保存データや非対応バージョンからもこれで復旧できる。
    pub fn recreate(mut store: S, camera: C, encoding: PhotoEncoding) -> Result<Self> {
        store.reset()?;
        let board = new_shuffled_board()?;
        store.save(&board)?;
        info!("board recreated");
        Ok(Self::with_board(store, camera, board, encoding))
    }

    fn with_board(store: S, camera: C, board: Board, encoding: PhotoEncoding) -> Self {
        Self {
            store,
            camera,
            board,
            current_cell: None,
            encoding,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_cell(&self) -> Option<usize> {
        self.current_cell
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// マスに写真を撮って保存（撮り直しも可）
    ///
    /// 失敗したときはボードを変更せず、カメラは閉じた状態に戻る。
    pub fn capture(&mut self, index: usize, source: CaptureSource<'_>) -> Result<&Cell> {
        if index >= self.board.len() {
            return Err(BingoError::CellOutOfRange(index + 1));
        }

        self.current_cell = Some(index);
        let frame = self.grab(source);
        self.camera.close();
        self.current_cell = None;

        let photo = frame?.to_photo(&self.encoding)?;

        // 保存に失敗したらメモリ上のボードも元に戻す
        let previous = self.board.clone();
        self.board.attach_photo(index, photo)?;
        if let Err(e) = self.store.save(&self.board) {
            self.board = previous;
            return Err(e);
        }

        info!(cell = index, completed = self.board.completed_count(), "photo captured");
        Ok(&self.board.cells()[index])
    }

    fn grab(&mut self, source: CaptureSource<'_>) -> Result<ImageFrame> {
        let frame = match source {
            CaptureSource::Device(facing) => self.camera.open(facing)?,
            CaptureSource::SwitchFacing => self.camera.switch_facing()?,
            CaptureSource::File(path) => ImageFrame::from_path(path)?,
        };
        debug!(
            width = frame.image.width(),
            height = frame.image.height(),
            facing = ?self.camera.active_facing(),
            "frame acquired"
        );
        Ok(frame)
    }
}
