//! アップロードプレビュー管理
//!
//! 選択されたローカルファイルごとにプレビューハンドルを作成し、
//! 差し替え・リセット・破棄のいずれかで一度だけ解放する。
//! 解放済みハンドルは `Option::take` で取り除くため、二重解放も
//! 解放後の参照も起こらない。

use crate::error::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// アップロード枠の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKind {
    /// 生成: 元の顔画像
    SourceImage,
    /// 生成: 対象動画
    TargetVideo,
    /// 検出: 解析する動画
    DetectVideo,
}

impl SlotKind {
    pub fn label(&self) -> &'static str {
        match self {
            SlotKind::SourceImage => "Source Face (Image)",
            SlotKind::TargetVideo => "Target Body (Video)",
            SlotKind::DetectVideo => "Video",
        }
    }

    /// 画像を受け付ける枠か
    pub fn expects_image(&self) -> bool {
        matches!(self, SlotKind::SourceImage)
    }
}

/// プレビューハンドルの作成・解放を行うバックエンド
pub trait PreviewBackend {
    type Handle;

    fn create(&mut self, file: &Path) -> Result<Self::Handle>;

    fn revoke(&mut self, handle: Self::Handle);
}

/// 選択済みファイルとプレビュー
#[derive(Debug)]
pub struct UploadSlot<H> {
    pub file: PathBuf,
    handle: Option<H>,
}

impl<H> UploadSlot<H> {
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// 解放前のみ参照できる
    pub fn preview(&self) -> Option<&H> {
        self.handle.as_ref()
    }
}

/// プレビュー管理
pub struct PreviewManager<B: PreviewBackend> {
    backend: B,
    slots: BTreeMap<SlotKind, UploadSlot<B::Handle>>,
}

impl<B: PreviewBackend> PreviewManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: BTreeMap::new(),
        }
    }

    /// ファイルを選択（既存のプレビューは解放する）
    pub fn select(&mut self, kind: SlotKind, file: &Path) -> Result<&UploadSlot<B::Handle>> {
        let handle = self.backend.create(file)?;
        self.clear(kind);
        tracing::debug!("プレビュー作成: {:?} {}", kind, file.display());
        let slot = self.slots.entry(kind).or_insert(UploadSlot {
            file: file.to_path_buf(),
            handle: Some(handle),
        });
        Ok(&*slot)
    }

    pub fn slot(&self, kind: SlotKind) -> Option<&UploadSlot<B::Handle>> {
        self.slots.get(&kind)
    }

    pub fn file(&self, kind: SlotKind) -> Option<&Path> {
        self.slots.get(&kind).map(|s| s.file.as_path())
    }

    /// 枠の選択を解除
    pub fn clear(&mut self, kind: SlotKind) {
        if let Some(mut slot) = self.slots.remove(&kind) {
            if let Some(handle) = slot.handle.take() {
                self.backend.revoke(handle);
            }
        }
    }

    /// 全枠をリセット（何度呼んでもよい）
    pub fn reset(&mut self) {
        let kinds: Vec<SlotKind> = self.slots.keys().copied().collect();
        for kind in kinds {
            self.clear(kind);
        }
    }
}

impl<B: PreviewBackend> Drop for PreviewManager<B> {
    fn drop(&mut self) {
        self.reset();
    }
}
