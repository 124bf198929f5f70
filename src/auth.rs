//! ログインフロー
//!
//! - メール/パスワード: /auth/login, /auth/signup
//! - 外部IDプロバイダ: プロフィールを受け取り /auth/log-visit に記録（失敗は無視）

use crate::api::ApiClient;
use crate::error::Result;
use std::path::Path;
use std::time::Duration;
use synthetix_common::types::FederatedProfile;
use synthetix_common::validation::LoginForm;
use synthetix_common::User;

/// 訪問記録を待つ上限（ログイン自体は止めない）
const VISIT_LOG_WAIT: Duration = Duration::from_secs(5);

/// フォーム入力でログイン・新規登録
pub async fn submit_login(client: &ApiClient, form: &LoginForm) -> Result<User> {
    form.validate()?;

    let user = if form.signup {
        client.signup(form.name.trim(), form.email.trim(), &form.password).await?
    } else {
        client.login(form.email.trim(), &form.password).await?
    };

    tracing::info!("ログイン成功: {}", user.email);
    Ok(user)
}

/// 外部IDプロバイダのプロフィールファイルを読む
pub fn load_federated_profile(path: &Path) -> Result<FederatedProfile> {
    let content = std::fs::read_to_string(path)?;
    let profile: FederatedProfile = serde_json::from_str(&content)?;
    Ok(profile)
}

/// 外部IDプロバイダでのログインを完了
pub async fn complete_federated_login(client: &ApiClient, profile: FederatedProfile) -> User {
    let user = User::from(profile);

    if tokio::time::timeout(VISIT_LOG_WAIT, client.log_visit(&user.email, &user.name))
        .await
        .is_err()
    {
        tracing::warn!("訪問記録が応答しないため待機を打ち切り");
    }

    tracing::info!("外部IDでログイン: {}", user.email);
    user
}
