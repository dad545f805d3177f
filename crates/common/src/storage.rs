//! Binary media storage collaborators.
//!
//! The gallery never owns binary content. Entries carry an opaque
//! [`ContentRef`] issued by a [`MediaStorage`] implementation, resolvable
//! to a directly retrievable URL on demand.

use std::collections::HashMap;
use std::path::PathBuf;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{AppError, AppResult};

/// Default chunk size used when streaming content (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Progress callback invoked with a transfer percentage in `[0, 100]`.
pub type ProgressFn<'a> = dyn Fn(u8) + Send + Sync + 'a;

/// Opaque reference to stored binary content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRef {
    /// Storage key (object key or relative path).
    pub key: String,
    /// Declared MIME content type.
    pub content_type: String,
}

/// Derive the storage key for a piece of content.
///
/// Keys are content-addressed (SHA-256) with a format extension, so a
/// re-uploaded payload maps to the same object. Entry identity is never
/// derived from the key.
#[must_use]
pub fn content_key(data: &[u8], content_type: &str) -> String {
    let digest = Sha256::digest(data);
    let ext = match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        _ => "bin",
    };
    format!("{digest:x}.{ext}")
}

const fn transfer_pct(done: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((done * 100) / total) as u8
    }
}

/// Binary content collaborator contract.
#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store raw content, reporting transfer progress as a percentage of
    /// bytes written.
    async fn upload(
        &self,
        data: Bytes,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> AppResult<ContentRef>;

    /// Delete stored content. Deleting missing content is not an error.
    async fn delete(&self, content: &ContentRef) -> AppResult<()>;

    /// Check whether content is present.
    async fn exists(&self, content: &ContentRef) -> AppResult<bool>;

    /// Directly retrievable URL for stored content.
    fn direct_url(&self, content: &ContentRef) -> String;
}

/// In-memory media storage.
///
/// Authoritative enough for tests and embedded use; transfers are chunked
/// so progress reporting behaves like the filesystem backend.
pub struct MemoryMediaStorage {
    objects: RwLock<HashMap<String, Bytes>>,
    base_url: String,
    chunk_size: usize,
}

impl MemoryMediaStorage {
    /// Create a new in-memory media storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            base_url: "memory:///media".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the transfer chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl Default for MemoryMediaStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MediaStorage for MemoryMediaStorage {
    async fn upload(
        &self,
        data: Bytes,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> AppResult<ContentRef> {
        let key = content_key(&data, content_type);
        let total = data.len();

        let mut written = 0;
        for chunk in data.chunks(self.chunk_size.max(1)) {
            written += chunk.len();
            progress(transfer_pct(written, total));
        }

        self.objects.write().await.insert(key.clone(), data);
        debug!(key = %key, size = total, "stored content in memory");

        Ok(ContentRef {
            key,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, content: &ContentRef) -> AppResult<()> {
        self.objects.write().await.remove(&content.key);
        Ok(())
    }

    async fn exists(&self, content: &ContentRef) -> AppResult<bool> {
        Ok(self.objects.read().await.contains_key(&content.key))
    }

    fn direct_url(&self, content: &ContentRef) -> String {
        format!("{}/{}", self.base_url, content.key)
    }
}

/// Local filesystem media storage.
pub struct LocalMediaStorage {
    base_path: PathBuf,
    base_url: String,
    chunk_size: usize,
}

impl LocalMediaStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the transfer chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

#[async_trait::async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(
        &self,
        data: Bytes,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> AppResult<ContentRef> {
        let key = content_key(&data, content_type);
        let path = self.base_path.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create file: {e}")))?;

        let total = data.len();
        let mut written = 0;
        for chunk in data.chunks(self.chunk_size.max(1)) {
            file.write_all(chunk)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;
            written += chunk.len();
            progress(transfer_pct(written, total));
        }
        file.flush()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to flush file: {e}")))?;

        debug!(key = %key, size = total, "stored content on disk");

        Ok(ContentRef {
            key,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, content: &ContentRef) -> AppResult<()> {
        let path = self.base_path.join(&content.key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    async fn exists(&self, content: &ContentRef) -> AppResult<bool> {
        Ok(self.base_path.join(&content.key).exists())
    }

    fn direct_url(&self, content: &ContentRef) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), content.key)
    }
}
