//! Gallery entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_common::ContentRef;

/// One gallery item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    /// Unique, immutable, store-assigned identifier; never reused.
    pub id: String,
    /// Free-text title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Opaque reference to binary content, owned by the media collaborator.
    pub media: ContentRef,
    /// Ascending display position. Need not be contiguous; the relative
    /// order matches the last accepted reorder submission.
    pub sort_order: i64,
    /// Set once at creation; never mutated.
    pub created_at: DateTime<Utc>,
}
