//! ジョブ状態管理
//!
//! 画面ごとに送信中のジョブは1つだけ。リセット後に届いた古い
//! レスポンスはチケットの世代番号で判別して捨てる（実際の通信は
//! 中断しない）。

use crate::error::{Error, Result};

/// ジョブの状態
#[derive(Debug, Clone, PartialEq)]
pub enum JobState<T> {
    Idle,
    Submitting,
    InFlight { progress: f32 },
    Succeeded(T),
    Failed(String),
}

impl<T> Default for JobState<T> {
    fn default() -> Self {
        JobState::Idle
    }
}

impl<T> JobState<T> {
    /// ローディング表示中か
    pub fn is_loading(&self) -> bool {
        matches!(self, JobState::Submitting | JobState::InFlight { .. })
    }

    pub fn progress(&self) -> f32 {
        match self {
            JobState::InFlight { progress } => *progress,
            JobState::Succeeded(_) => 100.0,
            _ => 0.0,
        }
    }

    pub fn output(&self) -> Option<&T> {
        match self {
            JobState::Succeeded(output) => Some(output),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            JobState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// 送信したジョブの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicket {
    generation: u64,
}

/// 画面ごとのジョブ管理
#[derive(Debug)]
pub struct JobTracker<T> {
    state: JobState<T>,
    generation: u64,
}

impl<T> Default for JobTracker<T> {
    fn default() -> Self {
        Self {
            state: JobState::Idle,
            generation: 0,
        }
    }
}

impl<T> JobTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &JobState<T> {
        &self.state
    }

    /// 送信開始。送信中なら拒否する
    pub fn begin(&mut self) -> Result<JobTicket> {
        if self.state.is_loading() {
            return Err(Error::JobInFlight);
        }
        self.generation += 1;
        self.state = JobState::Submitting;
        Ok(JobTicket {
            generation: self.generation,
        })
    }

    /// リクエスト送出後
    pub fn dispatched(&mut self, ticket: JobTicket) {
        if self.is_current(ticket) && matches!(self.state, JobState::Submitting) {
            self.state = JobState::InFlight { progress: 0.0 };
        }
    }

    /// 進捗更新（減らさない）
    pub fn set_progress(&mut self, ticket: JobTicket, value: f32) {
        if !self.is_current(ticket) {
            return;
        }
        if let JobState::InFlight { progress } = &mut self.state {
            *progress = progress.max(value.min(100.0));
        }
    }

    /// 結果を反映。古いチケットなら捨てて false を返す
    pub fn finish(&mut self, ticket: JobTicket, outcome: std::result::Result<T, String>) -> bool {
        if !self.is_current(ticket) || !self.state.is_loading() {
            tracing::debug!("古いジョブの結果を破棄");
            return false;
        }
        self.state = match outcome {
            Ok(output) => JobState::Succeeded(output),
            Err(message) => JobState::Failed(message),
        };
        true
    }

    /// ローカルリセット。送信中のレスポンスは以後無視される
    pub fn reset(&mut self) {
        if self.state.is_loading() {
            tracing::info!("送信中のジョブを放棄");
        }
        self.generation += 1;
        self.state = JobState::Idle;
    }

    fn is_current(&self, ticket: JobTicket) -> bool {
        ticket.generation == self.generation
    }
}
