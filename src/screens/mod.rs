//! 生成・検出画面
//!
//! 画面はアップロード枠（プレビュー）とジョブ状態を持つ。
//! 送信は `runner::drive` で監視し、成功時のみ履歴へ追加する。

pub mod detect;
pub mod generate;

pub use detect::DetectScreen;
pub use generate::GenerateScreen;

use crate::api::ApiClient;
use crate::config::Theme;
use crate::runner;
use indicatif::ProgressBar;
use synthetix_common::{ActivityLog, AttentionEvent, AttentionPlatform, HistoryStore, ProgressProfile, TabAttentionGuard};
use tokio::sync::mpsc;

/// 送信時に画面へ渡す共有リソース
pub struct JobEnv<'a, P: AttentionPlatform, S: HistoryStore> {
    pub client: &'a ApiClient,
    pub log: &'a mut ActivityLog<S>,
    pub guard: &'a mut TabAttentionGuard<P>,
    pub events: &'a mut mpsc::UnboundedReceiver<AttentionEvent>,
    pub theme: Theme,
    pub profile: ProgressProfile,
    /// false なら進捗を描画しない
    pub show_progress: bool,
}

impl<'a, P: AttentionPlatform, S: HistoryStore> JobEnv<'a, P, S> {
    pub(crate) fn progress_bar(&self, determinate: bool) -> ProgressBar {
        if self.show_progress {
            runner::progress_bar(self.theme, determinate)
        } else {
            ProgressBar::hidden()
        }
    }
}
