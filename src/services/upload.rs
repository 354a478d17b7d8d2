use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::models::{Attachment, FileRef};

/// Turns user attachments into stable references the chat request can point at.
#[async_trait::async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, attachments: &[Attachment]) -> Result<Vec<FileRef>>;
}

/// Content-addressed store on the local filesystem: each file is saved as
/// `<sha256>.<ext>`, so re-uploading the same image yields the same path.
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn store(&self, attachment: &Attachment) -> Result<FileRef> {
        let bytes = match attachment {
            Attachment::Path(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            Attachment::Inline { bytes, .. } => bytes.clone(),
        };

        if bytes.is_empty() {
            anyhow::bail!("{} is empty", attachment.display_name());
        }

        let digest = hex::encode(Sha256::digest(&bytes));
        let ext = attachment.extension().unwrap_or_else(|| "jpg".to_string());
        let path = self.root.join(format!("{}.{}", digest, ext));

        if tokio::fs::metadata(&path).await.is_ok() {
            log::debug!("♻️ {} already stored at {}", attachment.display_name(), path.display());
        } else {
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("💾 Stored {} ({} bytes) at {}", attachment.display_name(), bytes.len(), path.display());
        }

        Ok(FileRef {
            path,
            digest,
            size_bytes: bytes.len() as u64,
            uploaded_at: Utc::now(),
        })
    }
}

#[async_trait::async_trait]
impl AssetUploader for LocalAssetStore {
    async fn upload(&self, attachments: &[Attachment]) -> Result<Vec<FileRef>> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create upload directory {}", self.root.display()))?;

        let mut refs = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            refs.push(self.store(attachment).await?);
        }
        Ok(refs)
    }
}
