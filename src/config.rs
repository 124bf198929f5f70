use crate::error::{Result, SynthetixError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use synthetix_common::ProgressProfile;

/// 表示テーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// プログレスバーの色指定（indicatif テンプレート用）
    pub fn bar_colors(&self) -> &'static str {
        match self {
            Theme::Dark => "magenta/blue",
            Theme::Light => "blue/white",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub theme: Theme,
    /// トンネル経由時の警告ページを抑止するヘッダーを付ける
    pub bypass_proxy_warning: bool,
    pub detect_timeout_seconds: u64,
    pub progress_tick_millis: u64,
    /// 生成ジョブの想定所要時間（未設定なら既定の増分で進める）
    pub generate_estimate_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            theme: Theme::Dark,
            bypass_proxy_warning: true,
            detect_timeout_seconds: 120,
            progress_tick_millis: 2000,
            generate_estimate_seconds: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SynthetixError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("synthetix"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 履歴・ログの保存先
    pub fn data_dir() -> PathBuf {
        // 環境変数を優先
        if let Ok(dir) = std::env::var("SYNTHETIX_DATA_DIR") {
            return PathBuf::from(dir);
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("synthetix")
    }

    pub fn get_api_url(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(url) = std::env::var("SYNTHETIX_API_URL") {
            if !url.trim().is_empty() {
                return Ok(url.trim_end_matches('/').to_string());
            }
        }

        self.api_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or(SynthetixError::MissingApiUrl)
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SynthetixError::Config(format!("URLが不正です: {}", url)));
        }
        self.api_url = Some(url);
        self.save()
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.theme = self.theme.toggled();
        self.save()?;
        Ok(self.theme)
    }

    pub fn detect_timeout(&self) -> Duration {
        Duration::from_secs(self.detect_timeout_seconds)
    }

    pub fn progress_profile(&self) -> ProgressProfile {
        let tick = Duration::from_millis(self.progress_tick_millis.max(1));
        match self.generate_estimate_seconds {
            Some(secs) => ProgressProfile::for_estimate(Duration::from_secs(secs), tick),
            None => ProgressProfile {
                tick,
                ..ProgressProfile::default()
            },
        }
    }
}
