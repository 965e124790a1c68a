use clap::{Parser, Subcommand};
use crate::capture::Facing;
use crate::export::ExportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-bingo")]
#[command(about = "写真ビンゴ・ボード撮影と画像合成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ボードの状態を表示
    Board,

    /// マスに写真を撮る（撮り直しも可）
    Capture {
        /// マス番号（1〜25、左上から右へ）
        #[arg(required = true)]
        index: usize,

        /// カメラの向き (back/front)
        #[arg(long, default_value = "back")]
        facing: Facing,

        /// カメラの代わりに画像ファイルを使う
        #[arg(long, conflicts_with = "switch")]
        file: Option<PathBuf>,

        /// 前回と反対の向きで撮る
        #[arg(long)]
        switch: bool,
    },

    /// ボード画像を合成して保存
    Finalize {
        /// 出力ファイル/ディレクトリ（省略時は設定の出力先）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (jpeg/png)
        #[arg(short, long, default_value = "jpeg")]
        format: ExportFormat,

        /// 確認せずに実行
        #[arg(short, long)]
        yes: bool,
    },

    /// ボードを消して質問をシャッフルし直す
    Reset {
        /// 確認せずに実行
        #[arg(short, long)]
        yes: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// フォントファイル（TTF/OTF）を設定
        #[arg(long)]
        set_font: Option<PathBuf>,

        /// 背面カメラの撮影フォルダを設定
        #[arg(long)]
        set_back_dir: Option<PathBuf>,

        /// 前面カメラの撮影フォルダを設定
        #[arg(long)]
        set_front_dir: Option<PathBuf>,
    },
}

/// 1始まりのマス番号を0始まりに
pub fn cell_index(number: usize) -> Option<usize> {
    (1..=photo_bingo_common::BOARD_CELLS).contains(&number).then(|| number - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_capture() {
        let cli = Cli::parse_from(["photo-bingo", "capture", "7", "--facing", "front"]);
        match cli.command {
            Commands::Capture { index, facing, file, switch } => {
                assert_eq!(index, 7);
                assert_eq!(facing, Facing::Front);
                assert!(file.is_none());
                assert!(!switch);
            }
            _ => panic!("expected capture"),
        }
    }

    #[test]
    fn test_parse_finalize_defaults() {
        let cli = Cli::parse_from(["photo-bingo", "-v", "finalize"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Finalize { output, format, yes } => {
                assert!(output.is_none());
                assert_eq!(format, ExportFormat::Jpeg);
                assert!(!yes);
            }
            _ => panic!("expected finalize"),
        }
    }

    #[test]
    fn test_cell_index() {
        assert_eq!(cell_index(1), Some(0));
        assert_eq!(cell_index(25), Some(24));
        assert_eq!(cell_index(0), None);
        assert_eq!(cell_index(26), None);
    }
}
