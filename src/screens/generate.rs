//! 生成画面（顔画像 + 対象動画 → 合成動画）

use super::JobEnv;
use crate::api::GeneratedVideo;
use crate::error::{Result, SynthetixError};
use crate::media::{self, StagedPreview, StagingBackend};
use crate::runner::{self, AbandonSignal, JobMonitor, JobOutcome};
use std::path::{Path, PathBuf};
use synthetix_common::preview::UploadSlot;
use synthetix_common::{
    ActivityKind, ActivityResult, AttentionPlatform, GenerationResult, HistoryStore, JobState,
    JobTracker, PreviewManager, ProgressEstimator, SlotKind,
};

pub const GENERATE_FAILED: &str = "Generation failed. Check backend connection.";
pub const MISSING_FILES: &str = "Please upload both files.";
const IN_PROGRESS: &str = "Neural Synthesis In Progress... (approx. 5-7 min)";

pub struct GenerateScreen {
    previews: PreviewManager<StagingBackend>,
    job: JobTracker<GeneratedVideo>,
}

impl GenerateScreen {
    pub fn new(backend: StagingBackend) -> Self {
        Self {
            previews: PreviewManager::new(backend),
            job: JobTracker::new(),
        }
    }

    /// 元の顔画像を選ぶ
    pub fn select_source(&mut self, path: &Path) -> Result<&UploadSlot<StagedPreview>> {
        self.select(SlotKind::SourceImage, path)
    }

    /// 対象動画を選ぶ
    pub fn select_target(&mut self, path: &Path) -> Result<&UploadSlot<StagedPreview>> {
        self.select(SlotKind::TargetVideo, path)
    }

    fn select(&mut self, kind: SlotKind, path: &Path) -> Result<&UploadSlot<StagedPreview>> {
        media::validate_for_slot(kind, path)?;
        Ok(self.previews.select(kind, path)?)
    }

    pub fn slot(&self, kind: SlotKind) -> Option<&UploadSlot<StagedPreview>> {
        self.previews.slot(kind)
    }

    pub fn state(&self) -> &JobState<GeneratedVideo> {
        self.job.state()
    }

    /// 「もう一度生成」: 選択も結果も捨てる
    pub fn reset(&mut self) {
        self.job.reset();
        self.previews.reset();
    }

    /// 既定の出力先 `synthetix_<millis>.mp4`
    pub fn default_output(dir: &Path) -> PathBuf {
        dir.join(format!(
            "synthetix_{}.mp4",
            chrono::Local::now().timestamp_millis()
        ))
    }

    /// 合成ジョブを送信し、完了まで待つ
    ///
    /// 送信前の入力エラーだけを `Err` で返す。通信の失敗は
    /// `state()` に `Failed` として残る。
    pub async fn submit<P, S>(&mut self, env: &mut JobEnv<'_, P, S>, destination: PathBuf) -> Result<()>
    where
        P: AttentionPlatform,
        S: HistoryStore,
    {
        let (source, target) = match (
            self.previews.file(SlotKind::SourceImage),
            self.previews.file(SlotKind::TargetVideo),
        ) {
            (Some(source), Some(target)) => (source.to_path_buf(), target.to_path_buf()),
            _ => return Err(SynthetixError::Validation(MISSING_FILES.to_string())),
        };
        let target_name = media::file_name_of(&target);

        let ticket = self.job.begin()?;
        let client = env.client.clone();
        let abandon = AbandonSignal::default();
        let signal = abandon.clone();
        let request = async move {
            client
                .submit_generation(&source, &target, &destination, &signal)
                .await
        };
        self.job.dispatched(ticket);

        let bar = env.progress_bar(true);
        let mut estimator = ProgressEstimator::new(env.profile);
        let job = &mut self.job;
        let outcome = runner::drive(
            JobMonitor {
                guard: &mut *env.guard,
                events: &mut *env.events,
                estimator: Some(&mut estimator),
                bar: &bar,
                tick: env.profile.tick,
                message: IN_PROGRESS.to_string(),
                abandon,
            },
            request,
            |value| job.set_progress(ticket, value),
        )
        .await;
        bar.finish_and_clear();

        match outcome {
            JobOutcome::Completed(Ok(video)) => {
                let result = GenerationResult::success(Some(video.path.display().to_string()));
                self.job.finish(ticket, Ok(video));
                if let Err(e) = env.log.append(
                    ActivityKind::Generation,
                    target_name,
                    ActivityResult::Generation(result),
                ) {
                    tracing::warn!("履歴の保存に失敗: {}", e);
                }
            }
            JobOutcome::Completed(Err(e)) => {
                tracing::error!("生成失敗: {}", e);
                self.job.finish(ticket, Err(e.user_message(GENERATE_FAILED)));
            }
            JobOutcome::Abandoned => {
                self.job.reset();
            }
        }
        Ok(())
    }
}
