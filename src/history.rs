//! 履歴ファイルストア
//!
//! アクティビティ履歴をデータディレクトリ内の1つのJSONファイルに保存する。
//! ファイルがない・壊れている場合は空の履歴として扱う。

use crate::error::{Result, SynthetixError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use synthetix_common::{ActivityLog, ActivityLogEntry, HistoryStore};

/// 保存キー（ファイル名）
pub const HISTORY_FILE_NAME: &str = "synthetix_history.json";

/// JSONファイルによる履歴ストア
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(HISTORY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 履歴を開く（破損時は空）
    pub fn open(data_dir: &Path) -> ActivityLog<Self> {
        ActivityLog::load(Self::new(data_dir))
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> synthetix_common::Result<Vec<ActivityLogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let entries: Vec<ActivityLogEntry> = serde_json::from_reader(reader)?;
        Ok(entries)
    }

    fn save(&self, entries: &[ActivityLogEntry]) -> synthetix_common::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // 書き込み途中で壊れないよう一時ファイルから置き換える
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> synthetix_common::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 履歴一覧を表示用に整形
pub fn format_entries(entries: &[ActivityLogEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            format!(
                "[{}] {}  {}  {}",
                entry.kind.badge(),
                entry.recorded_at,
                entry.subject_name,
                entry.display_text()
            )
        })
        .collect()
}

/// 履歴を表示
pub fn print_history<S: HistoryStore>(log: &ActivityLog<S>) {
    println!("Session Log");
    if log.is_empty() {
        println!("  No recent activity.");
        return;
    }
    for line in format_entries(log.entries()) {
        println!("  {}", line);
    }
}

/// 履歴を削除
pub fn clear_history<S: HistoryStore>(log: &mut ActivityLog<S>) -> Result<()> {
    log.clear().map_err(SynthetixError::from)?;
    tracing::info!("履歴を削除");
    Ok(())
}
