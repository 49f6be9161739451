// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The attachment list for a patch set is owned by the mail-archive
//! ingestion collaborator (§1, out of scope): the Applier only needs to ask
//! "what files make up this patch, and which of them are patches?" This
//! trait is that narrow seam.

use async_trait::async_trait;
use cfbot_core::PatchId;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to list attachments for patch {0}")]
pub struct AttachmentSourceError(pub PatchId);

/// One file attached to a patch-set's mailing-list message.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub attachment_id: u64,
    pub filename: String,
    pub is_patch: bool,
}

#[async_trait]
pub trait AttachmentSource: Send + Sync {
    async fn attachments_for_patch(&self, patch_id: PatchId) -> Result<Vec<Attachment>, AttachmentSourceError>;
}

/// Reads a patch's attachment list from `<dir>/<patch-id>.json`, a JSON array
/// of [`Attachment`] rows. The mail-archive ingestion collaborator (§1) is
/// the thing that would normally populate this directory; `cfbotd` treats a
/// missing manifest as "no attachments recorded yet" rather than an error,
/// since a freshly-dequeued patch set may race the writer that produces it.
pub struct JsonDirectoryAttachmentSource {
    dir: PathBuf,
}

impl JsonDirectoryAttachmentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn manifest_path(&self, patch_id: PatchId) -> PathBuf {
        self.dir.join(format!("{patch_id}.json"))
    }
}

#[async_trait]
impl AttachmentSource for JsonDirectoryAttachmentSource {
    async fn attachments_for_patch(&self, patch_id: PatchId) -> Result<Vec<Attachment>, AttachmentSourceError> {
        let path = self.manifest_path(patch_id);
        let body = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                tracing::warn!(patch_id = %patch_id, path = %path.display(), error = %e, "failed to read attachment manifest");
                return Err(AttachmentSourceError(patch_id));
            }
        };
        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(patch_id = %patch_id, path = %path.display(), error = %e, "failed to parse attachment manifest");
            AttachmentSourceError(patch_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_manifest_is_an_empty_list_not_an_error() {
        let dir = tempdir().unwrap();
        let source = JsonDirectoryAttachmentSource::new(dir.path());
        let attachments = source.attachments_for_patch(PatchId::new(1)).await.unwrap();
        assert!(attachments.is_empty());
    }

    #[tokio::test]
    async fn reads_and_parses_a_manifest() {
        let dir = tempdir().unwrap();
        let body = r#"[{"attachment_id": 7, "filename": "v1-0001-fix.patch", "is_patch": true}]"#;
        std::fs::write(dir.path().join("1.json"), body).unwrap();
        let source = JsonDirectoryAttachmentSource::new(dir.path());
        let attachments = source.attachments_for_patch(PatchId::new(1)).await.unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "v1-0001-fix.patch");
        assert!(attachments[0].is_patch);
    }

    #[tokio::test]
    async fn malformed_manifest_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("1.json"), b"not json").unwrap();
        let source = JsonDirectoryAttachmentSource::new(dir.path());
        assert!(source.attachments_for_patch(PatchId::new(1)).await.is_err());
    }
}
