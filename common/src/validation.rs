//! 入力検証
//!
//! ログインフォームとプロフィール変更の入力チェック。

use crate::error::{Error, Result};

/// パスワードの最小文字数
pub const MIN_PASSWORD_LEN: usize = 6;

/// ログイン・新規登録フォーム
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub signup: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<()> {
        if self.signup && self.name.trim().is_empty() {
            return Err(Error::Validation("Full Name is required".into()));
        }
        if self.email.trim().is_empty() {
            return Err(Error::Validation("Email Address is required".into()));
        }
        if !self.email.contains('@') {
            return Err(Error::Validation(format!("Invalid email address: {}", self.email)));
        }
        if self.password.is_empty() {
            return Err(Error::Validation("Password is required".into()));
        }
        Ok(())
    }
}

/// パスワード変更の検証
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<()> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(Error::Validation("Please fill in all fields".into()));
    }
    if new != confirm {
        return Err(Error::Validation("New passwords do not match!".into()));
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// プロフィール編集の検証
pub fn validate_profile(name: &str, email: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Full Name is required".into()));
    }
    if !email.contains('@') {
        return Err(Error::Validation(format!("Invalid email address: {}", email)));
    }
    Ok(())
}
