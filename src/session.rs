//! ログインセッションの保存
//!
//! ワンショットのサブコマンド間でログイン状態を引き継ぐため、
//! ユーザー情報を設定ディレクトリに保存する。

use crate::error::{Result, SynthetixError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use synthetix_common::User;

const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    /// ログイン日時 (RFC3339)
    pub logged_in_at: String,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self {
            user,
            logged_in_at: chrono::Local::now().to_rfc3339(),
        }
    }

    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(SESSION_FILE_NAME)
    }

    /// 保存済みセッション（なければ None、壊れていれば破棄）
    pub fn load(config_dir: &Path) -> Option<Self> {
        let path = Self::path(config_dir);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("セッションファイルが不正です: {}", e);
                None
            }
        }
    }

    /// ログイン必須の操作で使う
    pub fn require(config_dir: &Path) -> Result<Self> {
        Self::load(config_dir).ok_or(SynthetixError::NotLoggedIn)
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(config_dir), content)?;
        Ok(())
    }

    /// ログアウト（セッションがなくてもエラーにしない）
    pub fn remove(config_dir: &Path) -> Result<bool> {
        match std::fs::remove_file(Self::path(config_dir)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn user() -> User {
        User {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            avatar: None,
        }
    }

    #[test]
    fn test_save_load_remove() {
        let dir = tempdir().unwrap();
        assert!(Session::load(dir.path()).is_none());
        assert!(matches!(Session::require(dir.path()), Err(SynthetixError::NotLoggedIn)));

        Session::new(user()).save(dir.path()).unwrap();
        let loaded = Session::require(dir.path()).unwrap();
        assert_eq!(loaded.user, user());

        assert!(Session::remove(dir.path()).unwrap());
        assert!(!Session::remove(dir.path()).unwrap());
        assert!(Session::load(dir.path()).is_none());
    }

    #[test]
    fn test_corrupted_session_is_ignored() {
        let dir = tempdir().unwrap();
        std::fs::write(Session::path(dir.path()), "{ broken").unwrap();
        assert!(Session::load(dir.path()).is_none());
    }
}
