//! ジョブ結果・ユーザーの型定義
//!
//! CLIと対話シェルで共有される型:
//! - DetectionResult: /detect のレスポンス（外部APIが生成、クライアントは表示のみ）
//! - GenerationResult: /generate 成功時に履歴へ記録する結果
//! - ActivityResult: 履歴エントリに格納される結果（上記いずれか）

use serde::{Deserialize, Serialize};
use std::fmt;

/// 検出判定ラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "REAL",
            Verdict::Fake => "FAKE",
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, Verdict::Fake)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// /detect のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub label: Verdict,

    /// FAKEである確率 (0.0-1.0)
    pub probability: f64,

    /// 判定の確信度 (0-100)
    pub confidence_percentage: f64,

    pub model_name: String,
}

impl DetectionResult {
    /// 履歴表示用テキスト（例: "FAKE (93%)"）
    ///
    /// ちょうど .5 は切り上げる（`{:.0}` は偶数丸めになるため使わない）。
    pub fn summary(&self) -> String {
        format!("{} ({}%)", self.label, (self.probability * 100.0).round())
    }
}

/// /generate 成功時の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub label: String,
    pub probability: f64,

    /// 保存先（ブラウザ版には存在しないため省略可）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl GenerationResult {
    pub const SUCCESS_LABEL: &'static str = "Success";

    pub fn success(output_path: Option<String>) -> Self {
        Self {
            label: Self::SUCCESS_LABEL.to_string(),
            probability: 1.0,
            output_path,
        }
    }
}

/// ジョブ種別（履歴バッジ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    #[serde(rename = "GEN")]
    Generation,
    #[serde(rename = "DET")]
    Detection,
}

impl ActivityKind {
    pub fn badge(&self) -> &'static str {
        match self {
            ActivityKind::Generation => "GEN",
            ActivityKind::Detection => "DET",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.badge())
    }
}

/// 履歴エントリの結果
///
/// 保存形式にタグを持たないため untagged で判別する。
/// DetectionResult の方がフィールドが多いので先に試す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityResult {
    Detection(DetectionResult),
    Generation(GenerationResult),
}

impl ActivityResult {
    pub fn display_text(&self) -> String {
        match self {
            ActivityResult::Generation(_) => GenerationResult::SUCCESS_LABEL.to_string(),
            ActivityResult::Detection(result) => result.summary(),
        }
    }
}

/// ログイン中のユーザー
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// 外部IDプロバイダが返すプロフィール
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedProfile {
    #[serde(default)]
    pub display_name: String,
    pub email: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl From<FederatedProfile> for User {
    fn from(profile: FederatedProfile) -> Self {
        Self {
            name: profile.display_name,
            email: profile.email,
            avatar: profile.photo_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_result_from_api_json() {
        let json = r#"{"label":"FAKE","probability":0.93,"confidence_percentage":93.0,"model_name":"XceptionNet-v2"}"#;
        let result: DetectionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.label, Verdict::Fake);
        assert_eq!(result.model_name, "XceptionNet-v2");
        assert_eq!(result.summary(), "FAKE (93%)");
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let json = r#"{"label":"MAYBE","probability":0.5,"confidence_percentage":50.0,"model_name":"m"}"#;
        assert!(serde_json::from_str::<DetectionResult>(json).is_err());
    }

    #[test]
    fn test_summary_rounds_probability() {
        let result = DetectionResult {
            label: Verdict::Real,
            probability: 0.125,
            confidence_percentage: 87.5,
            model_name: "m".into(),
        };
        assert_eq!(result.summary(), "REAL (13%)");

        let fake = DetectionResult {
            label: Verdict::Fake,
            probability: 0.625,
            ..result.clone()
        };
        assert_eq!(fake.summary(), "FAKE (63%)");

        let low = DetectionResult {
            probability: 0.934,
            ..fake
        };
        assert_eq!(low.summary(), "FAKE (93%)");
    }

    #[test]
    fn test_activity_result_untagged_generation() {
        // ブラウザ版の保存形式 {label:'Success', probability:1}
        let result: ActivityResult =
            serde_json::from_str(r#"{"label":"Success","probability":1}"#).unwrap();
        assert!(matches!(result, ActivityResult::Generation(_)));
        assert_eq!(result.display_text(), "Success");
    }

    #[test]
    fn test_activity_result_untagged_detection() {
        let json = r#"{"label":"REAL","probability":0.02,"confidence_percentage":98.0,"model_name":"m"}"#;
        let result: ActivityResult = serde_json::from_str(json).unwrap();
        assert!(matches!(result, ActivityResult::Detection(_)));
        assert_eq!(result.display_text(), "REAL (2%)");
    }

    #[test]
    fn test_federated_profile_to_user() {
        let json = r#"{"displayName":"Ada","email":"ada@example.com","photoURL":"https://img/ada.png"}"#;
        let profile: FederatedProfile = serde_json::from_str(json).unwrap();
        let user = User::from(profile);
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.avatar.as_deref(), Some("https://img/ada.png"));
    }

    #[test]
    fn test_user_tolerates_missing_fields() {
        let user: User = serde_json::from_str(r#"{"email":"x@example.com"}"#).unwrap();
        assert_eq!(user.email, "x@example.com");
        assert!(user.name.is_empty());
    }
}
