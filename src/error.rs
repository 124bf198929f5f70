use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthetixError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIのURLが設定されていません。`synthetix config --set-api-url URL` または SYNTHETIX_API_URL で設定してください")]
    MissingApiUrl,

    #[error("ログインしていません。`synthetix login` でログインしてください")]
    NotLoggedIn,

    #[error("認証エラー: {0}")]
    Auth(String),

    #[error("ネットワークエラー: {0}")]
    Network(String),

    #[error("サーバーエラー (HTTP {status}){}", server_detail(.message))]
    Server { status: u16, message: String },

    #[error("タイムアウト: {0}秒以内に応答がありませんでした")]
    Timeout(u64),

    #[error("入力エラー: {0}")]
    Validation(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("ジョブは放棄されました")]
    Abandoned,

    /// ジョブが失敗した（画面に表示する文言）
    #[error("{0}")]
    JobFailed(String),

    #[error("入力プロンプトエラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Common(#[from] synthetix_common::Error),
}

impl SynthetixError {
    /// ジョブ失敗時に画面へ表示する文言
    ///
    /// サーバーが `error` を返した場合はそれを優先する。
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            SynthetixError::Server { message, .. } if !message.is_empty() => message.clone(),
            SynthetixError::Timeout(secs) => {
                format!("Analysis timed out after {} seconds. Try a shorter clip.", secs)
            }
            SynthetixError::Validation(message) | SynthetixError::Auth(message) => message.clone(),
            SynthetixError::Common(synthetix_common::Error::Validation(message)) => message.clone(),
            SynthetixError::Common(synthetix_common::Error::JobInFlight) => {
                "A job is already running on this screen.".to_string()
            }
            _ => fallback.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SynthetixError::Timeout(_))
    }
}

impl From<dialoguer::Error> for SynthetixError {
    fn from(e: dialoguer::Error) -> Self {
        SynthetixError::Prompt(e.to_string())
    }
}

fn server_detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {}", message)
    }
}

pub type Result<T> = std::result::Result<T, SynthetixError>;
