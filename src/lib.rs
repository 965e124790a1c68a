//! photo-bingo
//!
//! 5×5の写真ビンゴ。マスごとに写真を撮り、最後に1枚のボード画像へ合成する。

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod progress;
pub mod session;
pub mod store;
