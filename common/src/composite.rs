//! 合成オーケストレーター
//!
//! 全25マスを描画面に描き、全マスの結果が揃った時点で一度だけ完了を通知する。
//!
//! ## 処理の流れ
//! 1. 描画面をキャンバスサイズで初期化・背景塗り
//! 2. 全マスをディスパッチ（未撮影マスは同期描画、写真マスはデコードを待つ）
//! 3. ファンインバリアで結果を数え、期待数に達したら `CompositeResult` を確定
//!
//! 期待数はディスパッチ前に固定する。デコードがディスパッチ中に同期的に解決しても、
//! 完了順がばらばらでも、完了通知は1回だけ。

use crate::board::Board;
use crate::geometry::Layout;
use crate::render::{CellContent, CellRenderer, PhotoDecoder, RenderOutcome};
use crate::surface::Surface;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// 合成結果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompositeResult {
    /// 写真付きで描画できたマス数
    pub completed_cell_count: usize,
    pub total_cell_count: usize,
    /// 描画に失敗したマス
    pub failed_cell_indices: BTreeSet<usize>,
}

impl CompositeResult {
    pub fn has_failures(&self) -> bool {
        !self.failed_cell_indices.is_empty()
    }
}

/// ファンインバリア
///
/// 期待数を生成時に固定し、結果を1件ずつ記録する。
/// `record` が `true` を返すのは、最後の1件を記録したその1回だけ。
#[derive(Debug)]
pub struct FanIn {
    expected: usize,
    seen: Vec<bool>,
    resolved: usize,
    fired: bool,
    result: CompositeResult,
}

impl FanIn {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            seen: vec![false; expected],
            resolved: 0,
            fired: false,
            result: CompositeResult {
                total_cell_count: expected,
                ..Default::default()
            },
        }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn resolved(&self) -> usize {
        self.resolved
    }

    pub fn is_done(&self) -> bool {
        self.fired
    }

    /// 結果を記録。このとき全件揃ったら `true`
    ///
    /// 同じマスの2回目以降・範囲外・完了後の記録は無視する。
    pub fn record(&mut self, outcome: &RenderOutcome) -> bool {
        if self.fired {
            warn!(cell = outcome.cell_index, "outcome recorded after completion, ignored");
            return false;
        }

        match self.seen.get_mut(outcome.cell_index) {
            Some(seen) if !*seen => *seen = true,
            Some(_) => {
                warn!(cell = outcome.cell_index, "duplicate outcome ignored");
                return false;
            }
            None => {
                warn!(cell = outcome.cell_index, expected = self.expected, "outcome out of range ignored");
                return false;
            }
        }

        self.resolved += 1;
        if outcome.success {
            if outcome.with_photo {
                self.result.completed_cell_count += 1;
            }
        } else {
            self.result.failed_cell_indices.insert(outcome.cell_index);
        }

        if self.resolved == self.expected {
            self.fired = true;
            return true;
        }
        false
    }

    /// 現時点の集計
    pub fn current(&self) -> &CompositeResult {
        &self.result
    }

    pub fn into_result(self) -> CompositeResult {
        self.result
    }
}

/// 合成の進捗通知
pub trait CompositeObserver {
    /// 1マス分の結果が出るたびに呼ばれる
    fn on_outcome(&mut self, _outcome: &RenderOutcome, _resolved: usize, _total: usize) {}

    /// 全マスが揃ったときに1回だけ呼ばれる
    fn on_complete(&mut self, _result: &CompositeResult) {}
}

impl CompositeObserver for () {}

/// 写真が1枚以上あれば合成できる
pub fn composite_allowed(board: &Board) -> bool {
    board.completed_count() > 0
}

/// 途中までしか埋まっていないときの確認ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmPolicy {
    /// 一部だけ埋まっているときは確認する
    #[default]
    WhenPartial,
    /// 確認しない
    Never,
}

impl ConfirmPolicy {
    /// 呼び出し側（UI）が確認を取るべきか
    pub fn requires_confirmation(&self, board: &Board) -> bool {
        match self {
            ConfirmPolicy::WhenPartial => {
                let completed = board.completed_count();
                completed > 0 && completed < board.len()
            }
            ConfirmPolicy::Never => false,
        }
    }
}

impl std::str::FromStr for ConfirmPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "when-partial" | "partial" => Ok(ConfirmPolicy::WhenPartial),
            "never" => Ok(ConfirmPolicy::Never),
            _ => Err(format!("Unknown confirm policy: {}. Use when-partial or never", s)),
        }
    }
}

impl std::fmt::Display for ConfirmPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmPolicy::WhenPartial => write!(f, "when-partial"),
            ConfirmPolicy::Never => write!(f, "never"),
        }
    }
}

/// 合成器
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    layout: Layout,
    renderer: CellRenderer,
}

impl Compositor {
    pub fn new(layout: Layout, renderer: CellRenderer) -> Self {
        Self { layout, renderer }
    }

    /// ボード全体を描画面に合成
    ///
    /// マス単位の失敗は `failed_cell_indices` に記録され、全体は止まらない。
    pub async fn composite<S, D, O>(
        &self,
        board: &Board,
        decoder: &D,
        surface: &mut S,
        observer: &mut O,
    ) -> CompositeResult
    where
        S: Surface,
        D: PhotoDecoder<Image = S::Image>,
        O: CompositeObserver,
    {
        let size = self.layout.total_size().round() as u32;
        surface.reset(size, size, self.renderer.style().board_background);

        let cells = board.cells();
        let mut barrier = FanIn::new(cells.len());
        let mut pending = FuturesUnordered::new();

        info!(total = cells.len(), completed = board.completed_count(), size, "compositing board");

        for (index, cell) in cells.iter().enumerate() {
            if cell.photo_to_render().is_some() {
                pending.push(async move { (index, self.renderer.resolve(index, cell, decoder).await) });
                continue;
            }

            let outcome = self.renderer.render_cell(
                surface,
                index,
                self.layout.cell_rect(index),
                cell,
                CellContent::Empty,
            );
            self.settle(&mut barrier, &outcome, observer);
        }

        debug!(pending = pending.len(), "waiting for photo decodes");

        while let Some((index, content)) = pending.next().await {
            let outcome = self.renderer.render_cell(
                surface,
                index,
                self.layout.cell_rect(index),
                &cells[index],
                content,
            );
            self.settle(&mut barrier, &outcome, observer);
        }

        barrier.into_result()
    }

    fn settle<O: CompositeObserver>(&self, barrier: &mut FanIn, outcome: &RenderOutcome, observer: &mut O) {
        let done = barrier.record(outcome);
        observer.on_outcome(outcome, barrier.resolved(), barrier.expected());

        if done {
            let result = barrier.current();
            info!(
                completed = result.completed_cell_count,
                failed = result.failed_cell_indices.len(),
                "all cells resolved"
            );
            observer.on_complete(result);
        }
    }
}
