//! Synthetix API連携
//!
//! - /auth/*: 認証（login, signup, log-visit）
//! - /generate: 顔合成（バイナリ動画を返す、タイムアウトなし）
//! - /detect: ディープフェイク検出（JSON判定を返す、120秒タイムアウト）
//!
//! どの呼び出しも1回きりで、失敗しても再試行しない。

mod client;

pub use client::{ApiClient, GeneratedVideo};

use serde::{Deserialize, Serialize};
use synthetix_common::User;

/// トンネル経由時の警告ページを抑止するヘッダー
pub const PROXY_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

/// ログインリクエスト
#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// 新規登録リクエスト
#[derive(Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// 訪問記録リクエスト
#[derive(Serialize)]
struct VisitRequest<'a> {
    email: &'a str,
    name: &'a str,
}

/// 認証レスポンス
#[derive(Deserialize)]
struct AuthResponse {
    user: User,
}

/// エラーレスポンス
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}
