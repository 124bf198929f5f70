//! アクティビティ履歴モジュール
//!
//! 生成・検出ジョブの結果を新しい順に最大20件保持する。
//! 変更のたびにストアへ書き込み（write-through）、
//! メモリ上の状態と永続化された状態を常に一致させる。

use crate::error::Result;
use crate::types::{ActivityKind, ActivityResult};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// 履歴の最大件数
pub const MAX_ENTRIES: usize = 20;

/// 履歴エントリ（作成後は不変）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// ミリ秒タイムスタンプ（ログ内で単調増加）
    pub id: i64,

    #[serde(rename = "type")]
    pub kind: ActivityKind,

    #[serde(rename = "name")]
    pub subject_name: String,

    pub result: ActivityResult,

    /// 表示用の記録時刻
    #[serde(rename = "time")]
    pub recorded_at: String,
}

impl ActivityLogEntry {
    pub fn display_text(&self) -> String {
        self.result.display_text()
    }
}

/// 履歴の永続化先
pub trait HistoryStore {
    /// 保存済みの履歴を読み込む（未保存なら空）
    fn load(&self) -> Result<Vec<ActivityLogEntry>>;

    /// 履歴全体を書き込む
    fn save(&self, entries: &[ActivityLogEntry]) -> Result<()>;

    /// 保存済みの履歴を削除
    fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}

/// アクティビティ履歴
pub struct ActivityLog<S: HistoryStore> {
    store: S,
    entries: Vec<ActivityLogEntry>,
}

impl<S: HistoryStore> ActivityLog<S> {
    /// ストアから読み込む
    ///
    /// 読み込み失敗・破損データは空の履歴として扱う。
    pub fn load(store: S) -> Self {
        let mut entries = match store.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("履歴の読み込みに失敗、空の履歴で開始します: {}", e);
                Vec::new()
            }
        };
        entries.truncate(MAX_ENTRIES);
        Self { store, entries }
    }

    /// 新しい順のエントリ
    pub fn entries(&self) -> &[ActivityLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 先頭に追加し、20件を超えた古いエントリを捨てる
    ///
    /// 書き込みに失敗した場合はメモリ上の履歴も変更しない。
    pub fn append(
        &mut self,
        kind: ActivityKind,
        subject_name: impl Into<String>,
        result: ActivityResult,
    ) -> Result<&ActivityLogEntry> {
        let now = Local::now();
        let id = match self.entries.first() {
            Some(newest) => now.timestamp_millis().max(newest.id + 1),
            None => now.timestamp_millis(),
        };

        let entry = ActivityLogEntry {
            id,
            kind,
            subject_name: subject_name.into(),
            result,
            recorded_at: now.format("%H:%M:%S").to_string(),
        };

        let mut updated = Vec::with_capacity(MAX_ENTRIES);
        updated.push(entry);
        updated.extend(self.entries.iter().take(MAX_ENTRIES - 1).cloned());

        self.store.save(&updated)?;
        self.entries = updated;
        tracing::debug!("履歴に追加: {} 件", self.entries.len());

        Ok(&self.entries[0])
    }

    /// 全件削除
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{DetectionResult, GenerationResult, Verdict};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// テスト用のメモリストア（書き込み内容を共有して検証する）
    #[derive(Clone, Default)]
    struct MemoryStore {
        saved: Rc<RefCell<Option<String>>>,
        fail_writes: Rc<RefCell<bool>>,
    }

    impl HistoryStore for MemoryStore {
        fn load(&self) -> Result<Vec<ActivityLogEntry>> {
            match self.saved.borrow().as_deref() {
                Some(json) => Ok(serde_json::from_str(json)?),
                None => Ok(Vec::new()),
            }
        }

        fn save(&self, entries: &[ActivityLogEntry]) -> Result<()> {
            if *self.fail_writes.borrow() {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            *self.saved.borrow_mut() = Some(serde_json::to_string(entries)?);
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            *self.saved.borrow_mut() = None;
            Ok(())
        }
    }

    fn detection(label: Verdict, probability: f64) -> ActivityResult {
        ActivityResult::Detection(DetectionResult {
            label,
            probability,
            confidence_percentage: probability * 100.0,
            model_name: "XceptionNet-v2".into(),
        })
    }

    #[test]
    fn test_append_prepends_newest_first() {
        let mut log = ActivityLog::load(MemoryStore::default());
        log.append(ActivityKind::Generation, "a.mp4", ActivityResult::Generation(GenerationResult::success(None)))
            .unwrap();
        log.append(ActivityKind::Detection, "b.mp4", detection(Verdict::Real, 0.1)).unwrap();

        let names: Vec<_> = log.entries().iter().map(|e| e.subject_name.as_str()).collect();
        assert_eq!(names, vec!["b.mp4", "a.mp4"]);
        assert!(log.entries()[0].id > log.entries()[1].id);
    }

    #[test]
    fn test_append_caps_at_twenty() {
        let mut log = ActivityLog::load(MemoryStore::default());
        for i in 0..45 {
            log.append(ActivityKind::Detection, format!("clip_{}.mp4", i), detection(Verdict::Fake, 0.5))
                .unwrap();
            assert!(log.len() <= MAX_ENTRIES);
        }
        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.entries()[0].subject_name, "clip_44.mp4");
        assert_eq!(log.entries()[MAX_ENTRIES - 1].subject_name, "clip_25.mp4");

        // IDは新しい順に厳密に減少
        for pair in log.entries().windows(2) {
            assert!(pair[0].id > pair[1].id);
        }
    }

    #[test]
    fn test_write_through_matches_store() {
        let store = MemoryStore::default();
        let mut log = ActivityLog::load(store.clone());
        log.append(ActivityKind::Detection, "x.mp4", detection(Verdict::Fake, 0.93)).unwrap();
        log.append(ActivityKind::Detection, "y.mp4", detection(Verdict::Real, 0.07)).unwrap();

        let reloaded = ActivityLog::load(store);
        assert_eq!(reloaded.entries(), log.entries());
    }

    #[test]
    fn test_clear_then_load_is_empty() {
        let store = MemoryStore::default();
        let mut log = ActivityLog::load(store.clone());
        log.append(ActivityKind::Detection, "x.mp4", detection(Verdict::Fake, 0.93)).unwrap();
        log.clear().unwrap();

        assert!(log.is_empty());
        assert!(ActivityLog::load(store).is_empty());
    }

    #[test]
    fn test_failed_write_leaves_log_unchanged() {
        let store = MemoryStore::default();
        let mut log = ActivityLog::load(store.clone());
        log.append(ActivityKind::Detection, "keep.mp4", detection(Verdict::Real, 0.2)).unwrap();

        *store.fail_writes.borrow_mut() = true;
        let result = log.append(ActivityKind::Detection, "lost.mp4", detection(Verdict::Fake, 0.9));
        assert!(result.is_err());
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].subject_name, "keep.mp4");
    }

    #[test]
    fn test_corrupted_store_degrades_to_empty() {
        let store = MemoryStore::default();
        *store.saved.borrow_mut() = Some("{ not json".to_string());
        let log = ActivityLog::load(store);
        assert!(log.is_empty());
    }

    #[test]
    fn test_detection_scenario_display() {
        let mut log = ActivityLog::load(MemoryStore::default());
        let entry = log
            .append(ActivityKind::Detection, "suspect.mp4", detection(Verdict::Fake, 0.93))
            .unwrap();
        assert_eq!(entry.kind.badge(), "DET");
        assert_eq!(entry.display_text(), "FAKE (93%)");
    }

    #[test]
    fn test_persisted_keys_match_storage_format() {
        let store = MemoryStore::default();
        let mut log = ActivityLog::load(store.clone());
        log.append(ActivityKind::Generation, "clip.mp4", ActivityResult::Generation(GenerationResult::success(None)))
            .unwrap();

        let json = store.saved.borrow().clone().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["type"], "GEN");
        assert_eq!(first["name"], "clip.mp4");
        assert_eq!(first["result"]["label"], "Success");
        assert!(first["id"].is_i64());
        assert!(first["time"].is_string());
    }
}
