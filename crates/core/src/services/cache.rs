//! Local cache and sync layer for the gallery entry list.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use vitrine_common::AppResult;
use vitrine_store::{GalleryEntry, GalleryStore};

/// Read-through cache of the single gallery resource.
///
/// Holds at most one snapshot of the ordered entry list. Every successful
/// mutation calls [`GalleryCache::notify_changed`], forcing the next read
/// to refetch from the store. There is no optimistic local mutation:
/// reads after a mutation always reflect the store's confirmed state.
///
/// The snapshot is a disposable projection — never ground truth, and in
/// particular never an input to authorization decisions. The layer does
/// not serialize concurrent calls; overlapping mutations from one session
/// are the caller's responsibility to prevent.
pub struct GalleryCache {
    store: Arc<dyn GalleryStore>,
    snapshot: RwLock<Option<Vec<GalleryEntry>>>,
}

impl GalleryCache {
    /// Create an empty cache over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn GalleryStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(None),
        }
    }

    /// Current ordered entry list, refetching from the store when the
    /// snapshot is stale.
    pub async fn entries(&self) -> AppResult<Vec<GalleryEntry>> {
        if let Some(entries) = self.snapshot.read().await.as_ref() {
            debug!(count = entries.len(), "gallery cache hit");
            return Ok(entries.clone());
        }

        let entries = self.store.list_entries().await?;
        debug!(count = entries.len(), "gallery cache refilled");
        *self.snapshot.write().await = Some(entries.clone());
        Ok(entries)
    }

    /// Mark the snapshot stale; the next read refetches.
    pub async fn notify_changed(&self) {
        debug!("gallery cache invalidated");
        *self.snapshot.write().await = None;
    }
}
