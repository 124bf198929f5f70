//! Synthetix Common Library
//!
//! CLIと対話シェルで共有される型・状態機械

pub mod types;
pub mod error;
pub mod history;
pub mod progress;
pub mod guard;
pub mod preview;
pub mod job;
pub mod validation;
pub mod report;

pub use types::{ActivityKind, ActivityResult, DetectionResult, GenerationResult, User, Verdict};
pub use error::{Error, Result};
pub use history::{ActivityLog, ActivityLogEntry, HistoryStore, MAX_ENTRIES};
pub use progress::{ProgressEstimator, ProgressProfile};
pub use guard::{AttentionEvent, AttentionPlatform, ExitDecision, TabAttentionGuard};
pub use preview::{PreviewBackend, PreviewManager, SlotKind};
pub use job::{JobState, JobTicket, JobTracker};
pub use report::ForensicReport;
