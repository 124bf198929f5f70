//! Synthetix AI クライアント
//!
//! 顔合成（generate）とディープフェイク検出（detect）の
//! ジョブ送信・進捗表示・履歴管理を行う。

pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod logging;
pub mod media;
pub mod runner;
pub mod screens;
pub mod session;
pub mod shell;
pub mod terminal;
