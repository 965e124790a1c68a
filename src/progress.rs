use indicatif::{ProgressBar, ProgressStyle};
use photo_bingo_common::{CompositeObserver, CompositeResult, RenderOutcome};

/// 合成の進捗バー
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} マス {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Self { bar }
    }

    /// 端末以外（テスト等）では何も表示しない
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl CompositeObserver for ProgressObserver {
    fn on_outcome(&mut self, outcome: &RenderOutcome, resolved: usize, _total: usize) {
        if !outcome.success {
            self.bar.set_message(format!("⚠ {}マス目を読み込めませんでした", outcome.cell_index + 1));
        }
        self.bar.set_position(resolved as u64);
    }

    fn on_complete(&mut self, result: &CompositeResult) {
        self.bar.finish_with_message(format!("完了（写真 {}枚）", result.completed_cell_count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_follows_resolved_count() {
        let mut observer = ProgressObserver::hidden();
        observer.on_outcome(
            &RenderOutcome {
                cell_index: 2,
                success: false,
                with_photo: true,
            },
            3,
            25,
        );
        assert_eq!(observer.position(), 3);
    }
}
