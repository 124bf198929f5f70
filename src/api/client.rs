//! Synthetix API クライアント（reqwest）

use super::{AuthResponse, ErrorBody, LoginRequest, SignupRequest, VisitRequest, PROXY_WARNING_HEADER};
use crate::config::Config;
use crate::error::{Result, SynthetixError};
use crate::media;
use crate::runner::AbandonSignal;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use std::path::{Path, PathBuf};
use std::time::Duration;
use synthetix_common::{DetectionResult, User};
use tokio::io::AsyncWriteExt;

/// 生成された動画
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVideo {
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bypass_proxy_warning: bool,
    detect_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, bypass_proxy_warning: bool, detect_timeout: Duration) -> Result<Self> {
        // 生成は5〜7分かかるためクライアント全体のタイムアウトは設定しない
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SynthetixError::Network(format!("HTTPクライアント初期化エラー: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bypass_proxy_warning,
            detect_timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.get_api_url()?,
            config.bypass_proxy_warning,
            config.detect_timeout(),
        )
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.http.post(format!("{}{}", self.base_url, path));
        if self.bypass_proxy_warning {
            request.header(PROXY_WARNING_HEADER, "true")
        } else {
            request
        }
    }

    /// メールアドレスとパスワードでログイン
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let response = self
            .post("/auth/login")
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| map_transport_error(e, None))?;

        read_auth_response(response).await
    }

    /// 新規登録
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let response = self
            .post("/auth/signup")
            .json(&SignupRequest { name, email, password })
            .send()
            .await
            .map_err(|e| map_transport_error(e, None))?;

        read_auth_response(response).await
    }

    /// 訪問記録（失敗しても無視する）
    pub async fn log_visit(&self, email: &str, name: &str) {
        let result = self
            .post("/auth/log-visit")
            .json(&VisitRequest { email, name })
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("訪問記録 OK");
            }
            Ok(response) => {
                tracing::warn!("訪問記録に失敗: HTTP {}", response.status());
            }
            Err(e) => {
                tracing::warn!("訪問記録に失敗: {}", e);
            }
        }
    }

    /// 顔合成ジョブを送信し、結果動画を `destination` に保存
    ///
    /// `abandon` が立った後に届いたレスポンスは保存しない。
    pub async fn submit_generation(
        &self,
        source_image: &Path,
        target_video: &Path,
        destination: &Path,
        abandon: &AbandonSignal,
    ) -> Result<GeneratedVideo> {
        let form = Form::new()
            .part("source_image", file_part(source_image).await?)
            .part("target_video", file_part(target_video).await?);

        tracing::info!(
            "生成リクエスト送信: source={} target={}",
            media::file_name_of(source_image),
            media::file_name_of(target_video)
        );

        let response = self
            .post("/generate")
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_transport_error(e, None))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let bytes = stream_to_file(response, destination, abandon).await?;

        tracing::info!("生成完了: {} ({} bytes)", destination.display(), bytes);
        Ok(GeneratedVideo {
            path: destination.to_path_buf(),
            bytes,
        })
    }

    /// 検出ジョブを送信
    pub async fn submit_detection(&self, video: &Path) -> Result<DetectionResult> {
        let form = Form::new().part("video", file_part(video).await?);
        let timeout = self.detect_timeout;

        tracing::info!("検出リクエスト送信: {}", media::file_name_of(video));

        let response = self
            .post("/detect")
            .multipart(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, Some(timeout)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let result: DetectionResult = response
            .json()
            .await
            .map_err(|e| {
                if e.is_decode() {
                    SynthetixError::Server {
                        status: 200,
                        message: format!("検出結果を解析できません: {}", e),
                    }
                } else {
                    map_transport_error(e, Some(timeout))
                }
            })?;

        tracing::info!(
            "検出完了: {} ({:.2}%, {})",
            result.label,
            result.confidence_percentage,
            result.model_name
        );
        Ok(result)
    }
}

/// ファイルをマルチパートの1項目にする
async fn file_part(path: &Path) -> Result<Part> {
    if !path.is_file() {
        return Err(SynthetixError::FileNotFound(path.display().to_string()));
    }
    let bytes = tokio::fs::read(path).await?;
    Part::bytes(bytes)
        .file_name(media::file_name_of(path))
        .mime_str(media::mime_type(path))
        .map_err(|e| SynthetixError::Validation(format!("Content-Typeが不正です: {}", e)))
}

/// レスポンス本体を `.part` へ書き出し、最後まで受け取れたら置き換える
async fn stream_to_file(response: Response, destination: &Path, abandon: &AbandonSignal) -> Result<u64> {
    if abandon.is_raised() {
        tracing::info!("放棄済みのため生成結果を破棄: {}", destination.display());
        return Err(SynthetixError::Abandoned);
    }
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let part = PartFile::for_destination(destination);
    let mut file = tokio::fs::File::create(&part.path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        if abandon.is_raised() {
            return Err(SynthetixError::Abandoned);
        }
        let chunk = chunk.map_err(|e| map_transport_error(e, None))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    if abandon.is_raised() {
        return Err(SynthetixError::Abandoned);
    }
    part.persist(destination).await?;
    Ok(written)
}

/// 書き込み途中のファイル
///
/// 確定しないまま drop されたら消す（失敗・放棄・プロセス終了時）。
struct PartFile {
    path: PathBuf,
    persisted: bool,
}

impl PartFile {
    fn for_destination(destination: &Path) -> Self {
        let mut name = destination
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        Self {
            path: destination.with_file_name(name),
            persisted: false,
        }
    }

    async fn persist(mut self, destination: &Path) -> Result<()> {
        tokio::fs::rename(&self.path, destination).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

async fn read_auth_response(response: Response) -> Result<User> {
    let status = response.status();
    if status.is_success() {
        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| SynthetixError::Server {
                status: status.as_u16(),
                message: format!("認証レスポンスを解析できません: {}", e),
            })?;
        return Ok(body.user);
    }

    if status.is_client_error() {
        let message = error_message(response)
            .await
            .unwrap_or_else(|| "Authentication failed".to_string());
        return Err(SynthetixError::Auth(message));
    }

    Err(error_from_response(response).await)
}

/// 2xx以外のレスポンスをエラーに変換
///
/// `error` フィールドがなければ message は空（表示側で既定文言を使う）。
async fn error_from_response(response: Response) -> SynthetixError {
    let status = response.status();
    let message = error_message(response).await.unwrap_or_default();
    tracing::warn!(
        "サーバーエラー: HTTP {} {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        message
    );
    SynthetixError::Server {
        status: status.as_u16(),
        message,
    }
}

/// エラーボディの `error` を取り出す
async fn error_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.trim().is_empty())
}

fn map_transport_error(e: reqwest::Error, timeout: Option<Duration>) -> SynthetixError {
    if e.is_timeout() {
        let secs = timeout.map(|t| t.as_secs()).unwrap_or_default();
        tracing::warn!("タイムアウト ({}秒)", secs);
        return SynthetixError::Timeout(secs);
    }
    tracing::warn!("通信エラー: {}", e);
    SynthetixError::Network(e.to_string())
}
