//! ボード保存の統合テスト

use photo_bingo::error::BingoError;
use photo_bingo::store::{BoardStore, JsonBoardStore};
use serde_json::json;
use tempfile::tempdir;

fn cells(count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| json!({ "id": i, "question": format!("Frage {}", i), "completed": false, "photo": null }))
        .collect()
}

/// 壊れたJSONは読み込みエラー（新しいボードで上書きしない）
#[test]
fn test_corrupt_file_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut store = JsonBoardStore::new(&path);
    let err = store.load().unwrap_err();
    assert!(matches!(err, BingoError::Persistence(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

/// 25マスでない保存データは読み込めない
#[test]
fn test_wrong_length_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(&path, json!({ "version": 1, "cells": cells(24) }).to_string()).unwrap();

    let mut store = JsonBoardStore::new(&path);
    let err = store.load().unwrap_err();
    assert!(matches!(err, BingoError::Persistence(_)));
    assert!(err.to_string().contains("24"));
}

/// 未対応バージョンはそのまま報告する
#[test]
fn test_version_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(&path, json!({ "version": 2, "cells": cells(25) }).to_string()).unwrap();

    let mut store = JsonBoardStore::new(&path);
    let err = store.load().unwrap_err();
    assert!(matches!(err, BingoError::IncompatibleStore { found: 2, supported: 1 }));
}

/// completed と写真の有無が食い違うマスは未撮影として読み込む
#[test]
fn test_load_inconsistent_cells_normalized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    let mut data = cells(25);
    data[7]["completed"] = json!(true);
    data[3]["photo"] = json!("data:image/jpeg;base64,/9j/4A==");
    data[11]["completed"] = json!(true);
    data[11]["photo"] = json!("data:image/jpeg;base64,/9j/4A==");
    std::fs::write(&path, json!({ "version": 1, "cells": data }).to_string()).unwrap();

    let mut store = JsonBoardStore::new(&path);
    let board = store.load().unwrap();

    assert_eq!(board.cell(7).unwrap().prompt, "Frage 7");
    assert!(!board.cell(7).unwrap().completed);
    assert!(board.cell(3).unwrap().photo.is_none());
    // 撮影済みとして数えるのは写真のあるマスだけ
    assert_eq!(board.completed_count(), 1);
    assert_eq!(
        board.cell(11).unwrap().photo_to_render().unwrap().bytes(),
        &[0xff, 0xd8, 0xff, 0xe0]
    );
}

/// 保存ファイルは version と question フィールドを持つ
#[test]
fn test_saved_file_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("board.json");

    let mut store = JsonBoardStore::new(&path);
    let board = store.load().unwrap();

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["version"], 1);
    let cells = saved["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 25);
    assert_eq!(cells[0]["id"], 0);
    assert_eq!(cells[0]["question"], board.cell(0).unwrap().prompt.as_str());
    assert_eq!(cells[0]["completed"], false);
}
