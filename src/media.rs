//! 入力メディアの判定とプレビュー用ステージング
//!
//! プレビューは選択ファイルを一時ディレクトリへコピーしたもの。
//! 解放時にコピーを削除する。

use crate::error::{Result, SynthetixError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use synthetix_common::{PreviewBackend, SlotKind};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "avi", "m4v"];

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

pub fn is_image(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_video(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// アップロード時の Content-Type
pub fn mime_type(path: &Path) -> &'static str {
    match extension_of(path).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 枠に合ったファイルか確認
pub fn validate_for_slot(kind: SlotKind, path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(SynthetixError::FileNotFound(path.display().to_string()));
    }

    let ok = if kind.expects_image() {
        is_image(path)
    } else {
        is_video(path)
    };
    if !ok {
        let expected = if kind.expects_image() { "image" } else { "video" };
        return Err(SynthetixError::Validation(format!(
            "{} must be an {} file: {}",
            kind.label(),
            expected,
            file_name_of(path)
        )));
    }
    Ok(())
}

/// ステージング済みプレビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPreview {
    pub path: PathBuf,
    pub size: u64,
}

/// 一時ディレクトリへコピーしてプレビューを作るバックエンド
#[derive(Debug)]
pub struct StagingBackend {
    dir: PathBuf,
}

impl StagingBackend {
    pub fn new() -> Result<Self> {
        let dir = std::env::temp_dir().join(format!(
            "synthetix-preview-{}-{}",
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        Self::in_dir(dir)
    }

    pub fn in_dir(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl PreviewBackend for StagingBackend {
    type Handle = StagedPreview;

    fn create(&mut self, file: &Path) -> synthetix_common::Result<StagedPreview> {
        let name = format!(
            "{}-{}",
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed),
            file_name_of(file)
        );
        let dest = self.dir.join(name);
        let size = std::fs::copy(file, &dest)?;
        Ok(StagedPreview { path: dest, size })
    }

    fn revoke(&mut self, handle: StagedPreview) {
        if let Err(e) = std::fs::remove_file(&handle.path) {
            tracing::warn!("プレビュー削除に失敗: {} ({})", handle.path.display(), e);
        }
    }
}

impl Drop for StagingBackend {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthetix_common::PreviewManager;
    use tempfile::tempdir;

    #[test]
    fn test_kind_detection_is_case_insensitive() {
        assert!(is_image(Path::new("face.JPG")));
        assert!(is_video(Path::new("clip.MP4")));
        assert!(!is_video(Path::new("face.png")));
        assert!(!is_image(Path::new("notes")));
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type(Path::new("a.png")), "image/png");
        assert_eq!(mime_type(Path::new("a.mov")), "video/quicktime");
        assert_eq!(mime_type(Path::new("a.bin")), "application/octet-stream");
    }

    #[test]
    fn test_validate_for_slot() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("face.png");
        let video = dir.path().join("body.mp4");
        std::fs::write(&image, b"png").unwrap();
        std::fs::write(&video, b"mp4").unwrap();

        assert!(validate_for_slot(SlotKind::SourceImage, &image).is_ok());
        assert!(validate_for_slot(SlotKind::TargetVideo, &video).is_ok());
        assert!(matches!(
            validate_for_slot(SlotKind::TargetVideo, &image),
            Err(SynthetixError::Validation(_))
        ));
        assert!(matches!(
            validate_for_slot(SlotKind::DetectVideo, &dir.path().join("missing.mp4")),
            Err(SynthetixError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_staged_copy_removed_on_reselect_and_reset() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.mp4");
        let second = dir.path().join("second.mp4");
        std::fs::write(&first, b"first").unwrap();
        std::fs::write(&second, b"second video").unwrap();

        let backend = StagingBackend::in_dir(dir.path().join("staging")).unwrap();
        let mut manager = PreviewManager::new(backend);

        let first_preview = manager
            .select(SlotKind::DetectVideo, &first)
            .unwrap()
            .preview()
            .cloned()
            .unwrap();
        assert!(first_preview.path.exists());
        assert_eq!(first_preview.size, 5);

        let second_preview = manager
            .select(SlotKind::DetectVideo, &second)
            .unwrap()
            .preview()
            .cloned()
            .unwrap();
        assert!(!first_preview.path.exists());
        assert!(second_preview.path.exists());

        manager.reset();
        manager.reset();
        assert!(!second_preview.path.exists());
        // 元ファイルは残る
        assert!(second.exists());
    }
}
