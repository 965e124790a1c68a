use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use photo_bingo::{capture, cli, config, error, export, progress, session, store};
use photo_bingo_common::{Board, GRID_SIZE};
use capture::FolderCamera;
use cli::{Cli, Commands};
use config::Config;
use error::BingoError;
use session::{CaptureSource, Session};
use store::JsonBoardStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::Board => {
            let session = open_session(&config)?;
            print_board(session.board());
        }

        Commands::Capture { index, facing, file, switch } => {
            println!("📷 photo-bingo - 撮影\n");

            let cell = cli::cell_index(index).ok_or(BingoError::CellOutOfRange(index))?;
            let mut session = open_session(&config)?;

            let source = match (&file, switch) {
                (Some(path), _) => CaptureSource::File(path.as_path()),
                (None, true) => CaptureSource::SwitchFacing,
                (None, false) => CaptureSource::Device(facing),
            };

            let prompt = session.board().cells()[cell].prompt.clone();
            println!("- {}マス目「{}」を撮影中...", index, prompt);
            session.capture(cell, source)?;

            let board = session.board();
            println!("✔ 保存しました（{}/{}マス）", board.completed_count(), board.len());
            if board.is_full() {
                println!("\n🎉 ビンゴ完成！ `photo-bingo finalize` で画像を保存できます");
            }
        }

        Commands::Finalize { output, format, yes } => {
            println!("🖼  photo-bingo - ボード画像の合成\n");

            let session = open_session(&config)?;
            let board = session.board();

            if board.completed_count() == 0 {
                return Err(BingoError::NothingToComposite.into());
            }

            if !yes && config.confirm.requires_confirmation(board) {
                let open = board.len() - board.completed_count();
                let proceed = Confirm::new()
                    .with_prompt(format!("まだ{}マス残っています。このまま仕上げますか？", open))
                    .default(false)
                    .interact()
                    .context("確認の入力に失敗しました")?;
                if !proceed {
                    return Err(BingoError::Cancelled.into());
                }
            }

            println!("[1/2] 合成中...");
            let mut observer = progress::ProgressObserver::new(board.len());
            let output_dir = output.unwrap_or_else(|| config.output_dir());
            let today = chrono::Local::now().date_naive();

            let report = export::finalize(board, &config, &output_dir, format, today, &mut observer).await?;

            println!("[2/2] 保存中...");
            println!("✔ 出力: {}", report.path.display());
            println!(
                "  写真: {}/{}マス",
                report.result.completed_cell_count, report.result.total_cell_count
            );
            if report.result.has_failures() {
                let failed: Vec<String> = report
                    .result
                    .failed_cell_indices
                    .iter()
                    .map(|i| (i + 1).to_string())
                    .collect();
                println!("⚠ 読み込めなかったマス: {}", failed.join(", "));
            }

            println!("\n✅ 完了");
        }

        Commands::Reset { yes } => {
            if !yes {
                let proceed = Confirm::new()
                    .with_prompt("撮影した写真をすべて消して、新しいボードを作りますか？")
                    .default(false)
                    .interact()
                    .context("確認の入力に失敗しました")?;
                if !proceed {
                    return Err(BingoError::Cancelled.into());
                }
            }

            // 保存データは読まない（壊れていても作り直せるように）
            let (store, camera) = session_parts(&config)?;
            let session = Session::recreate(store, camera, config.photo_encoding())?;
            println!("✔ 新しいボードを作成しました\n");
            print_board(session.board());
        }

        Commands::Config { show, set_font, set_back_dir, set_front_dir } => {
            let mut config = config;
            let changed = set_font.is_some() || set_back_dir.is_some() || set_front_dir.is_some();

            if let Some(path) = set_font {
                config.set_font_path(path)?;
                println!("✔ フォントを設定しました");
            }
            if let Some(dir) = set_back_dir {
                config.set_capture_dir(false, dir)?;
                println!("✔ 背面カメラのフォルダを設定しました");
            }
            if let Some(dir) = set_front_dir {
                config.set_capture_dir(true, dir)?;
                println!("✔ 前面カメラのフォルダを設定しました");
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                let path_or = |p: Option<std::path::PathBuf>| {
                    p.map(|p| p.display().to_string()).unwrap_or_else(|| "未設定".to_string())
                };
                println!("設定:");
                println!("  ボード保存先: {}", config.board_path()?.display());
                println!("  出力先: {}", config.output_dir().display());
                let font = config.font_path.clone().or_else(|| config.system_font_path());
                println!(
                    "  フォント: {}",
                    font.map(|p| p.display().to_string()).unwrap_or_else(|| "同梱 (DejaVu Sans Bold)".to_string())
                );
                println!("  背面カメラ: {}", path_or(config.capture_back_dir.clone()));
                println!("  前面カメラ: {}", path_or(config.capture_front_dir.clone()));
                println!("  デコードタイムアウト: {}秒", config.decode_timeout().as_secs());
                println!("  同時デコード数: {}", config.max_concurrent_decodes);
                println!("  写真の長辺上限: {}px", config.max_photo_edge);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!("  未撮影マスの文字: {}", config.empty_cell_text);
                println!("  仕上げ前の確認: {}", config.confirm);
            }
        }
    }

    Ok(())
}

/// `--verbose` で debug、それ以外は warn（RUST_LOG があればそちらを優先）
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn session_parts(config: &Config) -> error::Result<(JsonBoardStore, FolderCamera)> {
    let store = JsonBoardStore::new(config.board_path()?);
    let camera = FolderCamera::new(config.capture_back_dir.clone(), config.capture_front_dir.clone());
    Ok((store, camera))
}

fn open_session(config: &Config) -> error::Result<Session<JsonBoardStore, FolderCamera>> {
    let (store, camera) = session_parts(config)?;
    Session::open(store, camera, config.photo_encoding())
}

fn print_board(board: &Board) {
    println!("ボード（{}/{}マス）:", board.completed_count(), board.len());
    for (i, cell) in board.cells().iter().enumerate() {
        let mark = if cell.completed { "✔" } else { "・" };
        println!("  {:>2} {} {}", i + 1, mark, cell.prompt);
        if (i + 1) % GRID_SIZE == 0 && i + 1 < board.len() {
            println!();
        }
    }
}
