//! 撮影フローの統合テスト

use image::{Rgb, RgbImage};
use photo_bingo::capture::{CaptureDevice, CaptureError, Facing, FolderCamera, PhotoEncoding};
use photo_bingo::error::BingoError;
use photo_bingo::session::{CaptureSource, Session};
use photo_bingo::store::{BoardStore, JsonBoardStore};
use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn write_image(path: &Path, width: u32, height: u32, age: Duration) {
    RgbImage::from_pixel(width, height, Rgb([90, 120, 150])).save(path).unwrap();
    let modified = SystemTime::now() - age;
    File::options().write(true).open(path).unwrap().set_modified(modified).unwrap();
}

/// 最新の画像がフレームになる
#[test]
fn test_folder_camera_takes_newest_image() {
    let dir = tempdir().unwrap();
    write_image(&dir.path().join("old.png"), 6, 4, Duration::from_secs(600));
    write_image(&dir.path().join("new.png"), 3, 2, Duration::from_secs(5));
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let mut camera = FolderCamera::new(Some(dir.path().to_path_buf()), None);
    let frame = camera.open(Facing::Back).unwrap();

    assert_eq!((frame.image.width(), frame.image.height()), (3, 2));
    assert_eq!(frame.source.as_deref(), Some(dir.path().join("new.png").as_path()));
    assert_eq!(camera.active_facing(), Some(Facing::Back));

    camera.close();
    assert_eq!(camera.active_facing(), None);
}

/// 指定の向きが使えなければもう一方で開く
#[test]
fn test_folder_camera_falls_back_to_other_facing() {
    let dir = tempdir().unwrap();
    write_image(&dir.path().join("selfie.png"), 4, 4, Duration::from_secs(1));

    let mut camera = FolderCamera::new(None, Some(dir.path().to_path_buf()));
    camera.open(Facing::Back).unwrap();
    assert_eq!(camera.active_facing(), Some(Facing::Front));
}

/// 向きの切り替え
#[test]
fn test_switch_facing() {
    let back = tempdir().unwrap();
    let front = tempdir().unwrap();
    write_image(&back.path().join("a.png"), 8, 8, Duration::from_secs(1));
    write_image(&front.path().join("b.png"), 2, 2, Duration::from_secs(1));

    let mut camera = FolderCamera::new(Some(back.path().to_path_buf()), Some(front.path().to_path_buf()));
    camera.open(Facing::Back).unwrap();
    let frame = camera.switch_facing().unwrap();

    assert_eq!(camera.active_facing(), Some(Facing::Front));
    assert_eq!(frame.image.width(), 2);
}

/// どちらも使えなければ最初のエラーを返す
#[test]
fn test_no_camera_available() {
    let mut camera = FolderCamera::new(None, None);
    let err = camera.open(Facing::Front).unwrap_err();
    assert!(matches!(err, CaptureError::NotConfigured(Facing::Front)));
}

/// ファイルから撮影してボードに保存
#[test]
fn test_capture_from_file_persists() {
    let dir = tempdir().unwrap();
    let photo_path = dir.path().join("shot.png");
    write_image(&photo_path, 40, 30, Duration::from_secs(1));

    let board_path = dir.path().join("board.json");
    let camera = FolderCamera::default();
    let mut session = Session::open(JsonBoardStore::new(&board_path), camera, PhotoEncoding::default()).unwrap();

    let cell = session.capture(3, CaptureSource::File(&photo_path)).unwrap();
    assert!(cell.completed);
    let photo = cell.photo.as_ref().unwrap();
    assert_eq!(photo.mime(), "image/jpeg");
    assert_eq!(&photo.bytes()[..2], &[0xff, 0xd8]);

    // 保存データから読み直しても残っている
    let reloaded = JsonBoardStore::new(&board_path).load().unwrap();
    assert_eq!(reloaded.completed_count(), 1);
    assert!(reloaded.cell(3).unwrap().completed);
    assert_eq!(reloaded, *session.board());
}

/// 撮り直しは上書き（completed のまま）
#[test]
fn test_recapture_overwrites() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.png");
    let second = dir.path().join("second.png");
    write_image(&first, 10, 10, Duration::from_secs(1));
    write_image(&second, 20, 10, Duration::from_secs(1));

    let mut session =
        Session::open(JsonBoardStore::new(dir.path().join("board.json")), FolderCamera::default(), PhotoEncoding::default()).unwrap();
    session.capture(0, CaptureSource::File(&first)).unwrap();
    let before = session.board().cell(0).unwrap().photo.clone();
    session.capture(0, CaptureSource::File(&second)).unwrap();

    assert_eq!(session.board().completed_count(), 1);
    assert_ne!(session.board().cell(0).unwrap().photo, before);
}

/// 撮影エラーではボードも保存データも変わらない
#[test]
fn test_capture_error_leaves_store_untouched() {
    let dir = tempdir().unwrap();
    let board_path = dir.path().join("board.json");
    let mut session = Session::open(JsonBoardStore::new(&board_path), FolderCamera::default(), PhotoEncoding::default()).unwrap();
    let saved_before = std::fs::read_to_string(&board_path).unwrap();

    let err = session.capture(2, CaptureSource::Device(Facing::Back)).unwrap_err();
    assert!(matches!(err, BingoError::Capture(CaptureError::NotConfigured(Facing::Back))));

    let err = session
        .capture(2, CaptureSource::File(&dir.path().join("missing.jpg")))
        .unwrap_err();
    assert!(matches!(err, BingoError::Capture(CaptureError::Unreadable(_))));

    assert_eq!(session.board().completed_count(), 0);
    assert_eq!(std::fs::read_to_string(&board_path).unwrap(), saved_before);
}

/// 読めない保存データからでも作り直せる
#[test]
fn test_recreate_recovers_unreadable_store() {
    let dir = tempdir().unwrap();
    for (name, content) in [
        ("future.json", r#"{"version":2,"cells":[]}"#),
        ("corrupt.json", "{ not json"),
    ] {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        assert!(Session::open(JsonBoardStore::new(&path), FolderCamera::default(), PhotoEncoding::default()).is_err());

        let session =
            Session::recreate(JsonBoardStore::new(&path), FolderCamera::default(), PhotoEncoding::default()).unwrap();
        assert_eq!(session.board().len(), 25);
        assert_eq!(session.board().completed_count(), 0);

        let reloaded = JsonBoardStore::new(&path).load().unwrap();
        assert_eq!(reloaded, *session.board());
    }
}
