//! 履歴ファイルテスト
//!
//! JSONファイルによる履歴の保存・読み込み・破損時の動作を検証

use synthetix::history::{format_entries, FileHistoryStore, HISTORY_FILE_NAME};
use synthetix_common::{
    ActivityKind, ActivityResult, DetectionResult, GenerationResult, HistoryStore, Verdict, MAX_ENTRIES,
};
use tempfile::tempdir;

fn detection(label: Verdict, probability: f64) -> ActivityResult {
    ActivityResult::Detection(DetectionResult {
        label,
        probability,
        confidence_percentage: probability * 100.0,
        model_name: "XceptionNet-v2".to_string(),
    })
}

/// 履歴ファイルがない場合
#[test]
fn test_missing_file_is_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let log = FileHistoryStore::open(dir.path());

    assert!(log.is_empty());
    assert!(!dir.path().join(HISTORY_FILE_NAME).exists());
}

/// 追加のたびにファイルへ書き込まれる
#[test]
fn test_append_writes_through() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut log = FileHistoryStore::open(dir.path());

    log.append(ActivityKind::Detection, "suspect.mp4", detection(Verdict::Fake, 0.93))
        .expect("追加失敗");
    log.append(
        ActivityKind::Generation,
        "clip.mp4",
        ActivityResult::Generation(GenerationResult::success(None)),
    )
    .expect("追加失敗");

    let reloaded = FileHistoryStore::open(dir.path());
    assert_eq!(reloaded.entries(), log.entries());
    assert_eq!(reloaded.entries()[0].subject_name, "clip.mp4");
    assert_eq!(reloaded.entries()[1].display_text(), "FAKE (93%)");
}

/// 20件を超えると古いものから消える
#[test]
fn test_cap_is_kept_on_disk() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut log = FileHistoryStore::open(dir.path());

    for i in 0..25 {
        log.append(ActivityKind::Detection, format!("video_{}.mp4", i), detection(Verdict::Real, 0.1))
            .expect("追加失敗");
    }

    let reloaded = FileHistoryStore::open(dir.path());
    assert_eq!(reloaded.len(), MAX_ENTRIES);
    assert_eq!(reloaded.entries()[0].subject_name, "video_24.mp4");
    assert_eq!(reloaded.entries()[MAX_ENTRIES - 1].subject_name, "video_5.mp4");

    // id は新しい順に厳密に減少
    let ids: Vec<i64> = reloaded.entries().iter().map(|e| e.id).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
}

/// 壊れたファイルは空の履歴として扱う
#[test]
fn test_corrupted_file_is_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join(HISTORY_FILE_NAME), "{ not json").unwrap();

    let mut log = FileHistoryStore::open(dir.path());
    assert!(log.is_empty());

    // 次の追加で正しい内容に置き換わる
    log.append(ActivityKind::Detection, "a.mp4", detection(Verdict::Real, 0.2))
        .expect("追加失敗");
    assert_eq!(FileHistoryStore::open(dir.path()).len(), 1);
}

/// 削除後は空
#[test]
fn test_clear_removes_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut log = FileHistoryStore::open(dir.path());
    log.append(ActivityKind::Detection, "a.mp4", detection(Verdict::Fake, 0.7))
        .expect("追加失敗");

    synthetix::history::clear_history(&mut log).expect("削除失敗");
    assert!(log.is_empty());
    assert!(!dir.path().join(HISTORY_FILE_NAME).exists());
    assert!(FileHistoryStore::open(dir.path()).is_empty());

    // 2回目も失敗しない
    FileHistoryStore::new(dir.path()).clear().expect("削除失敗");
}

/// 保存形式のキー
#[test]
fn test_storage_keys() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut log = FileHistoryStore::open(dir.path());
    log.append(ActivityKind::Detection, "a.mp4", detection(Verdict::Fake, 0.93))
        .expect("追加失敗");

    let content = std::fs::read_to_string(dir.path().join(HISTORY_FILE_NAME)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let entry = &value[0];
    assert_eq!(entry["type"], "DET");
    assert_eq!(entry["name"], "a.mp4");
    assert_eq!(entry["result"]["label"], "FAKE");
    assert!(entry["time"].is_string());
    assert!(entry["id"].is_i64());
}

/// 表示用の整形
#[test]
fn test_format_entries() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut log = FileHistoryStore::open(dir.path());
    log.append(ActivityKind::Detection, "suspect.mp4", detection(Verdict::Fake, 0.93))
        .expect("追加失敗");

    let lines = format_entries(log.entries());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("[DET] "));
    assert!(lines[0].ends_with("suspect.mp4  FAKE (93%)"));
}
