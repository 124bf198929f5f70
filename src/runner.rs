//! ジョブ実行ループ
//!
//! リクエスト完了・進捗の定期更新・離脱イベントを `tokio::select!` で待つ。
//! リクエストは別タスクで走らせ、ユーザーが放棄を確定した場合は
//! タスクを切り離すだけで通信自体は止めない（結果は破棄される）。
//! 切り離したタスクは [`AbandonSignal`] で放棄を知り、ファイルを残さない。

use crate::config::Theme;
use crate::error::{Result, SynthetixError};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use synthetix_common::{AttentionEvent, AttentionPlatform, ExitDecision, ProgressEstimator, TabAttentionGuard};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const TAB_WARNING: &str =
    "Warning: You switched away! Please keep this window open and active to prevent the server connection from dropping.";
pub const CONFIRM_EXIT: &str =
    "Press Ctrl+C again to abandon this job (the server will keep processing it).";

/// ジョブの結末
#[derive(Debug)]
pub enum JobOutcome<T> {
    /// レスポンスを受信した（成功・失敗）
    Completed(Result<T>),
    /// ユーザーが放棄した
    Abandoned,
}

/// 放棄の通知
///
/// 切り離されたリクエスト側が、遅れて届いたレスポンスを捨てるために見る。
#[derive(Debug, Clone, Default)]
pub struct AbandonSignal(Arc<AtomicBool>);

impl AbandonSignal {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 実行中の監視対象
pub struct JobMonitor<'a, P: AttentionPlatform> {
    pub guard: &'a mut TabAttentionGuard<P>,
    pub events: &'a mut mpsc::UnboundedReceiver<AttentionEvent>,
    /// なければ進捗率を出さない（スピナー表示）
    pub estimator: Option<&'a mut ProgressEstimator>,
    pub bar: &'a ProgressBar,
    pub tick: Duration,
    /// 通常時のメッセージ
    pub message: String,
    /// 放棄を確定したら立てる
    pub abandon: AbandonSignal,
}

impl<'a, P: AttentionPlatform> JobMonitor<'a, P> {
    fn refresh_message(&self) {
        let message = if self.guard.exit_pending() {
            CONFIRM_EXIT.to_string()
        } else if self.guard.warning() {
            TAB_WARNING.to_string()
        } else {
            self.message.clone()
        };
        self.bar.set_message(message);
    }

    fn finish(&mut self, succeeded: bool) {
        self.guard.release();
        if let Some(estimator) = self.estimator.as_deref_mut() {
            if succeeded {
                estimator.complete();
                self.bar.set_position(100);
            } else {
                estimator.reset();
            }
        }
    }
}

/// ジョブを実行し、完了・放棄まで監視する
///
/// `on_progress` は進捗が進むたびに呼ばれる。
pub async fn drive<P, T, F>(
    mut monitor: JobMonitor<'_, P>,
    job: F,
    mut on_progress: impl FnMut(f32),
) -> JobOutcome<T>
where
    P: AttentionPlatform,
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let mut handle = tokio::spawn(job);

    // 前のジョブの後に届いたイベントは持ち越さない
    while monitor.events.try_recv().is_ok() {}
    monitor.guard.engage();
    if let Some(estimator) = monitor.estimator.as_deref_mut() {
        estimator.start();
    }
    monitor.refresh_message();

    let mut ticker = interval_at(Instant::now() + monitor.tick, monitor.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            joined = &mut handle => {
                let result = joined.unwrap_or_else(|e| {
                    Err(SynthetixError::Network(format!("ジョブの実行に失敗: {}", e)))
                });
                monitor.finish(result.is_ok());
                return JobOutcome::Completed(result);
            }
            Some(event) = monitor.events.recv() => {
                if let Some(ExitDecision::Confirmed) = monitor.guard.handle(event) {
                    monitor.finish(false);
                    monitor.abandon.raise();
                    // タスクは切り離す（レスポンスは捨てられる）
                    drop(handle);
                    return JobOutcome::Abandoned;
                }
                monitor.refresh_message();
            }
            _ = ticker.tick() => {
                if let Some(estimator) = monitor.estimator.as_deref_mut() {
                    let value = estimator.tick();
                    monitor.bar.set_position(value as u64);
                    on_progress(value);
                }
                monitor.bar.tick();
            }
        }
    }
}

/// 進捗バーを作る
pub fn progress_bar(theme: Theme, determinate: bool) -> ProgressBar {
    if determinate {
        let template = format!(
            "{{spinner}} [{{elapsed_precise}}] [{{bar:40.{}}}] {{pos:>3}}%  {{msg}}",
            theme.bar_colors()
        );
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar
    } else {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}
