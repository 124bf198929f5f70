//! 検出画面（動画 → REAL/FAKE 判定）

use super::JobEnv;
use crate::error::{Result, SynthetixError};
use crate::export;
use crate::media::{self, StagedPreview, StagingBackend};
use crate::runner::{self, AbandonSignal, JobMonitor, JobOutcome};
use std::path::{Path, PathBuf};
use synthetix_common::preview::UploadSlot;
use synthetix_common::{
    ActivityKind, ActivityResult, AttentionPlatform, DetectionResult, ForensicReport, HistoryStore,
    JobState, JobTracker, PreviewManager, SlotKind,
};

pub const DETECT_FAILED: &str = "Analysis failed. Make sure backend is running.";
pub const MISSING_VIDEO: &str = "Please upload a video for analysis.";
const IN_PROGRESS: &str = "Analyzing frames...";

pub struct DetectScreen {
    previews: PreviewManager<StagingBackend>,
    job: JobTracker<DetectionResult>,
}

impl DetectScreen {
    pub fn new(backend: StagingBackend) -> Self {
        Self {
            previews: PreviewManager::new(backend),
            job: JobTracker::new(),
        }
    }

    /// 動画を選ぶ（前回の結果・エラーは消える）
    pub fn select(&mut self, path: &Path) -> Result<&UploadSlot<StagedPreview>> {
        media::validate_for_slot(SlotKind::DetectVideo, path)?;
        if !self.job.state().is_loading() {
            self.job.reset();
        }
        Ok(self.previews.select(SlotKind::DetectVideo, path)?)
    }

    /// 選択だけ取り消す
    pub fn clear_selection(&mut self) {
        self.previews.clear(SlotKind::DetectVideo);
    }

    /// 選択・結果・エラーをすべて消す
    pub fn reset(&mut self) {
        self.previews.reset();
        self.job.reset();
    }

    pub fn slot(&self) -> Option<&UploadSlot<StagedPreview>> {
        self.previews.slot(SlotKind::DetectVideo)
    }

    pub fn state(&self) -> &JobState<DetectionResult> {
        self.job.state()
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.job.state().output()
    }

    /// 検出ジョブを送信し、完了まで待つ
    ///
    /// 送信前の入力エラーだけを `Err` で返す。
    pub async fn submit<P, S>(&mut self, env: &mut JobEnv<'_, P, S>) -> Result<()>
    where
        P: AttentionPlatform,
        S: HistoryStore,
    {
        let video = match self.previews.file(SlotKind::DetectVideo) {
            Some(video) => video.to_path_buf(),
            None => return Err(SynthetixError::Validation(MISSING_VIDEO.to_string())),
        };
        let video_name = media::file_name_of(&video);

        let ticket = self.job.begin()?;
        let client = env.client.clone();
        let request = async move { client.submit_detection(&video).await };
        self.job.dispatched(ticket);

        let bar = env.progress_bar(false);
        let outcome = runner::drive(
            JobMonitor {
                guard: &mut *env.guard,
                events: &mut *env.events,
                estimator: None,
                bar: &bar,
                tick: env.profile.tick,
                message: IN_PROGRESS.to_string(),
                abandon: AbandonSignal::default(),
            },
            request,
            |_| {},
        )
        .await;
        bar.finish_and_clear();

        match outcome {
            JobOutcome::Completed(Ok(result)) => {
                let entry = ActivityResult::Detection(result.clone());
                self.job.finish(ticket, Ok(result));
                if let Err(e) = env.log.append(ActivityKind::Detection, video_name, entry) {
                    tracing::warn!("履歴の保存に失敗: {}", e);
                }
            }
            JobOutcome::Completed(Err(e)) => {
                tracing::error!("検出失敗: {}", e);
                self.job.finish(ticket, Err(e.user_message(DETECT_FAILED)));
            }
            JobOutcome::Abandoned => {
                self.job.reset();
            }
        }
        Ok(())
    }

    /// 判定結果を PDF レポートに書き出す
    pub fn export_report(&self, output: Option<&Path>) -> Result<PathBuf> {
        let (slot, result) = match (self.slot(), self.result()) {
            (Some(slot), Some(result)) => (slot, result),
            _ => {
                return Err(SynthetixError::Validation(
                    "No analysis result to export.".to_string(),
                ))
            }
        };

        let report = ForensicReport::new(
            slot.file_name(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            result.clone(),
        );
        export::export_report(&report, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_select_and_clear() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("suspect.mp4");
        std::fs::write(&video, b"mp4").unwrap();

        let mut screen = DetectScreen::new(StagingBackend::in_dir(dir.path().join("stage")).unwrap());
        let staged = screen.select(&video).unwrap().preview().cloned().unwrap();
        assert!(staged.path.exists());

        screen.clear_selection();
        assert!(!staged.path.exists());
        assert!(screen.slot().is_none());
        screen.clear_selection();
    }

    #[test]
    fn test_export_without_result_fails() {
        let dir = tempdir().unwrap();
        let screen = DetectScreen::new(StagingBackend::in_dir(dir.path().join("stage")).unwrap());
        assert!(matches!(
            screen.export_report(Some(dir.path())),
            Err(SynthetixError::Validation(_))
        ));
    }
}
