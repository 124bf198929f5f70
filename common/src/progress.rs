//! 進捗推定モジュール
//!
//! サーバーは進捗を返さないため、リクエスト送信中に表示用の進捗率を
//! 一定間隔で進める。50%未満は粗く、50%以上は細かく増やし、
//! 完了レスポンスが届くまでは95%を超えない。

use std::time::Duration;

/// 進捗の増やし方
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressProfile {
    /// 更新間隔
    pub tick: Duration,
    /// 50%未満での増分
    pub coarse_step: f32,
    /// 50%以上での増分
    pub fine_step: f32,
    /// 増分を切り替える境界
    pub threshold: f32,
    /// 送信中の上限
    pub ceiling: f32,
}

impl Default for ProgressProfile {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(2),
            coarse_step: 0.5,
            fine_step: 0.2,
            threshold: 50.0,
            ceiling: 95.0,
        }
    }
}

impl ProgressProfile {
    /// 想定所要時間で上限に届くよう増分を調整する
    ///
    /// 粗い増分と細かい増分の比率 (5:2) は既定値と同じ。
    pub fn for_estimate(estimate: Duration, tick: Duration) -> Self {
        let base = Self::default();
        if tick.is_zero() || estimate.is_zero() {
            return Self { tick, ..base };
        }

        let ticks = (estimate.as_secs_f32() / tick.as_secs_f32()).max(1.0);
        let ratio = base.coarse_step / base.fine_step;
        // threshold / (ratio * f) + (ceiling - threshold) / f = ticks
        let fine_step = (base.threshold / ratio + (base.ceiling - base.threshold)) / ticks;

        Self {
            tick,
            coarse_step: fine_step * ratio,
            fine_step,
            ..base
        }
    }

    fn step_at(&self, value: f32) -> f32 {
        if value < self.threshold {
            self.coarse_step
        } else {
            self.fine_step
        }
    }
}

/// 表示用の進捗率（0-100）
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    profile: ProgressProfile,
    value: f32,
    in_flight: bool,
}

impl ProgressEstimator {
    pub fn new(profile: ProgressProfile) -> Self {
        Self {
            profile,
            value: 0.0,
            in_flight: false,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// 送信開始（0%から）
    pub fn start(&mut self) {
        self.value = 0.0;
        self.in_flight = true;
    }

    /// 1回分進める。送信中でなければ何もしない
    pub fn tick(&mut self) -> f32 {
        if !self.in_flight || self.value >= self.profile.ceiling {
            return self.value;
        }
        let next = self.value + self.profile.step_at(self.value);
        self.value = next.min(self.profile.ceiling);
        self.value
    }

    /// 成功レスポンス受信
    pub fn complete(&mut self) {
        self.in_flight = false;
        self.value = 100.0;
    }

    /// 失敗・リセット
    pub fn reset(&mut self) {
        self.in_flight = false;
        self.value = 0.0;
    }
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self::new(ProgressProfile::default())
    }
}
