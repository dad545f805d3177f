//! Reorder engine: adjacent transpositions over the full order.

use std::sync::Arc;

use tracing::debug;

use vitrine_common::{AppError, AppResult};
use vitrine_store::GalleryStore;

use crate::services::auth::AuthService;
use crate::services::cache::GalleryCache;

/// Direction of a discrete move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the front of the order.
    Up,
    /// Toward the back of the order.
    Down,
}

/// Computes a new total order from a discrete move and resubmits it.
///
/// There is no partial reorder primitive: every accepted move submits the
/// entire id sequence, so concurrent reorders from different sessions do
/// not merge — the last accepted submission fully determines the order.
pub struct ReorderService {
    auth: Arc<AuthService>,
    store: Arc<dyn GalleryStore>,
    cache: Arc<GalleryCache>,
}

impl ReorderService {
    /// Create the engine over its collaborators.
    #[must_use]
    pub fn new(
        auth: Arc<AuthService>,
        store: Arc<dyn GalleryStore>,
        cache: Arc<GalleryCache>,
    ) -> Self {
        Self { auth, store, cache }
    }

    /// Move the entry at `index` one position in `direction`.
    ///
    /// Moving the first entry up or the last entry down is a no-op that
    /// issues no store call and returns `Ok(false)`. Otherwise the full
    /// transposed id sequence is submitted in one call and the cache is
    /// invalidated; returns `Ok(true)`.
    pub async fn move_entry(&self, index: usize, direction: Direction) -> AppResult<bool> {
        let caller = self.auth.require_admin().await?;
        let entries = self.cache.entries().await?;

        if index >= entries.len() {
            return Err(AppError::InvalidArgument(format!(
                "Index out of range: {index}"
            )));
        }

        let neighbor = match direction {
            Direction::Up => {
                if index == 0 {
                    return Ok(false);
                }
                index - 1
            }
            Direction::Down => {
                if index + 1 == entries.len() {
                    return Ok(false);
                }
                index + 1
            }
        };

        let mut ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        ids.swap(index, neighbor);

        self.store.reorder_entries(&caller, &ids).await?;
        self.cache.notify_changed().await;
        debug!(index, ?direction, "submitted full reorder");
        Ok(true)
    }
}
