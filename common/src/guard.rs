//! 離脱防止ガード
//!
//! 長時間ジョブの送信中にユーザーが画面を離れたり閉じたりするのを抑止する。
//! 実際のイベント登録・タイトル変更は `AttentionPlatform` に委譲するため、
//! UIランタイムなしでテストできる。
//!
//! 警告はあくまで表示用で、送信中のリクエストを止めることはない。

/// 送信中に表示するタイトル
pub const WARNING_TITLE: &str = "⚠️ DON'T CLOSE! Processing...";

/// 通常時のタイトル
pub const DEFAULT_TITLE: &str = "Synthetix AI";

/// プラットフォームから届く注意イベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionEvent {
    /// 画面が背面に回った
    Hidden,
    /// 画面が前面に戻った
    Visible,
    /// 閉じようとした
    ExitAttempt,
}

/// 終了操作への応答
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// ガード非作動中、そのまま終了してよい
    Allow,
    /// 確認が必要（もう一度で中断）
    NeedsConfirmation,
    /// 確認済み、ジョブを放棄する
    Confirmed,
}

/// イベント登録・タイトル変更を行うプラットフォーム層
pub trait AttentionPlatform {
    /// 終了阻止と表示状態の監視を登録
    fn register(&mut self);

    /// 登録をすべて解除
    fn unregister(&mut self);

    fn set_title(&mut self, title: &str);
}

/// 離脱防止ガード
pub struct TabAttentionGuard<P: AttentionPlatform> {
    platform: P,
    engaged: bool,
    warning: bool,
    exit_pending: bool,
}

impl<P: AttentionPlatform> TabAttentionGuard<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            engaged: false,
            warning: false,
            exit_pending: false,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// 背面警告が出ているか
    pub fn warning(&self) -> bool {
        self.warning
    }

    /// 終了確認待ちか
    pub fn exit_pending(&self) -> bool {
        self.exit_pending
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// ジョブが送信中になったら作動
    pub fn engage(&mut self) {
        if self.engaged {
            return;
        }
        self.engaged = true;
        self.warning = false;
        self.exit_pending = false;
        self.platform.register();
        tracing::debug!("離脱防止ガード作動");
    }

    /// 成功・失敗・リセット時に解除（何度呼んでもよい）
    pub fn release(&mut self) {
        if !self.engaged {
            return;
        }
        self.engaged = false;
        self.warning = false;
        self.exit_pending = false;
        self.platform.unregister();
        self.platform.set_title(DEFAULT_TITLE);
        tracing::debug!("離脱防止ガード解除");
    }

    pub fn on_become_hidden(&mut self) {
        if !self.engaged {
            return;
        }
        self.warning = true;
        self.platform.set_title(WARNING_TITLE);
        tracing::info!("送信中に画面が背面へ移動");
    }

    pub fn on_become_visible(&mut self) {
        if !self.engaged {
            return;
        }
        self.warning = false;
        self.platform.set_title(DEFAULT_TITLE);
    }

    pub fn on_exit_attempt(&mut self) -> ExitDecision {
        if !self.engaged {
            return ExitDecision::Allow;
        }
        if self.exit_pending {
            tracing::warn!("ユーザーが送信中のジョブを放棄");
            return ExitDecision::Confirmed;
        }
        self.exit_pending = true;
        ExitDecision::NeedsConfirmation
    }

    /// イベントを振り分ける
    pub fn handle(&mut self, event: AttentionEvent) -> Option<ExitDecision> {
        match event {
            AttentionEvent::Hidden => {
                self.on_become_hidden();
                None
            }
            AttentionEvent::Visible => {
                self.on_become_visible();
                None
            }
            AttentionEvent::ExitAttempt => Some(self.on_exit_attempt()),
        }
    }
}

impl<P: AttentionPlatform> Drop for TabAttentionGuard<P> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakePlatform {
        registered: bool,
        register_calls: usize,
        unregister_calls: usize,
        titles: Vec<String>,
    }

    impl AttentionPlatform for FakePlatform {
        fn register(&mut self) {
            self.registered = true;
            self.register_calls += 1;
        }

        fn unregister(&mut self) {
            self.registered = false;
            self.unregister_calls += 1;
        }

        fn set_title(&mut self, title: &str) {
            self.titles.push(title.to_string());
        }
    }

    #[test]
    fn test_hide_and_show_toggle_warning() {
        let mut guard = TabAttentionGuard::new(FakePlatform::default());
        guard.engage();

        guard.handle(AttentionEvent::Hidden);
        assert!(guard.warning());
        assert_eq!(guard.platform().titles.last().unwrap(), WARNING_TITLE);

        guard.handle(AttentionEvent::Visible);
        assert!(!guard.warning());
        assert_eq!(guard.platform().titles.last().unwrap(), DEFAULT_TITLE);
    }

    #[test]
    fn test_no_effect_after_release() {
        let mut guard = TabAttentionGuard::new(FakePlatform::default());
        guard.engage();
        guard.handle(AttentionEvent::Hidden);
        guard.release();

        assert!(!guard.platform().registered);
        assert!(!guard.warning());
        assert_eq!(guard.platform().titles.last().unwrap(), DEFAULT_TITLE);

        let titles_before = guard.platform().titles.len();
        guard.handle(AttentionEvent::Hidden);
        assert!(!guard.warning());
        guard.handle(AttentionEvent::Visible);
        assert!(!guard.warning());
        assert_eq!(guard.platform().titles.len(), titles_before);
        assert_eq!(guard.handle(AttentionEvent::ExitAttempt), Some(ExitDecision::Allow));
    }

    #[test]
    fn test_idle_guard_ignores_events() {
        let mut guard = TabAttentionGuard::new(FakePlatform::default());
        guard.handle(AttentionEvent::Hidden);
        assert!(!guard.warning());
        assert!(guard.platform().titles.is_empty());
    }

    #[test]
    fn test_exit_requires_confirmation() {
        let mut guard = TabAttentionGuard::new(FakePlatform::default());
        guard.engage();
        assert_eq!(guard.on_exit_attempt(), ExitDecision::NeedsConfirmation);
        assert!(guard.exit_pending());
        assert_eq!(guard.on_exit_attempt(), ExitDecision::Confirmed);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut guard = TabAttentionGuard::new(FakePlatform::default());
        guard.engage();
        guard.engage();
        guard.release();
        guard.release();
        assert_eq!(guard.platform().register_calls, 1);
        assert_eq!(guard.platform().unregister_calls, 1);
    }

    #[test]
    fn test_reengage_clears_previous_state() {
        let mut guard = TabAttentionGuard::new(FakePlatform::default());
        guard.engage();
        guard.on_exit_attempt();
        guard.release();
        guard.engage();
        assert!(!guard.exit_pending());
        assert_eq!(guard.on_exit_attempt(), ExitDecision::NeedsConfirmation);
    }
}
