//! Remote gallery store contract.

use async_trait::async_trait;
use vitrine_common::{AppResult, ContentRef};

use crate::{GalleryEntry, Principal, Role, UserProfile};

/// Content types accepted for entry media.
pub const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Returns whether a declared content type is accepted for entry media.
#[must_use]
pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

/// The authoritative gallery backend.
///
/// The store is the single source of truth for the entry set, its order,
/// and role assignments. Its role checks are authoritative; any check a
/// client performs first is only a fast-fail convenience.
#[async_trait]
pub trait GalleryStore: Send + Sync {
    /// List all entries, ascending by sort order. Available to any caller.
    async fn list_entries(&self) -> AppResult<Vec<GalleryEntry>>;

    /// Create a new entry for previously stored media, appended at the
    /// end of the current order. The store assigns the id and re-validates
    /// the media content type. Requires Admin.
    async fn create_entry(
        &self,
        caller: &Principal,
        media: ContentRef,
        title: &str,
        description: &str,
    ) -> AppResult<()>;

    /// Update an entry's metadata. Requires Admin; fails `NotFound` for an
    /// unknown id.
    async fn update_entry(
        &self,
        caller: &Principal,
        id: &str,
        title: &str,
        description: &str,
    ) -> AppResult<()>;

    /// Delete an entry. Requires Admin; fails `NotFound` for an unknown
    /// id. The order collapses without renumbering surviving entries.
    async fn delete_entry(&self, caller: &Principal, id: &str) -> AppResult<()>;

    /// Atomically replace the whole ordering. Requires Admin; fails
    /// `InvalidArgument` unless `ids` is exactly a permutation of the
    /// existing id set, in which case stored order is left unchanged.
    async fn reorder_entries(&self, caller: &Principal, ids: &[String]) -> AppResult<()>;

    /// Role derived from the caller's principal. Absent or unknown
    /// principals are `Guest`; the authoritative implementation never
    /// errs, though remote transports may.
    async fn current_role(&self, caller: Option<&Principal>) -> AppResult<Role>;

    /// Assign a role to a principal. Requires Admin. Initial Admin
    /// bootstrap is an operational concern outside this contract.
    async fn assign_role(&self, caller: &Principal, user: &Principal, role: Role) -> AppResult<()>;

    /// The principal currently holding Admin; `NotFound` when none is
    /// assigned.
    async fn current_admin(&self) -> AppResult<Principal>;

    /// Fetch a principal's display profile.
    async fn get_profile(&self, user: &Principal) -> AppResult<Option<UserProfile>>;

    /// Save the caller's own display profile.
    async fn save_profile(&self, caller: &Principal, profile: UserProfile) -> AppResult<()>;
}
