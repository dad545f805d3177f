//! In-memory authoritative gallery store.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use vitrine_common::{AppError, AppResult, ContentRef, IdGenerator};

use crate::store::{GalleryStore, is_allowed_content_type};
use crate::{GalleryEntry, Principal, Role, UserProfile};

#[derive(Default)]
struct Inner {
    /// Kept sorted ascending by `sort_order`.
    entries: Vec<GalleryEntry>,
    roles: HashMap<Principal, Role>,
    profiles: HashMap<Principal, UserProfile>,
    /// Always greater than every assigned `sort_order`.
    next_order: i64,
}

impl Inner {
    fn require_admin(&self, caller: &Principal) -> AppResult<()> {
        match self.roles.get(caller).copied().unwrap_or_default() {
            Role::Admin => Ok(()),
            Role::User | Role::Guest => Err(AppError::AuthorizationDenied(
                "admin role required".to_string(),
            )),
        }
    }
}

/// Authoritative in-process gallery store.
///
/// Ground truth for the test suite and for embedded deployments. All role
/// checks happen here regardless of what the client checked first.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    id_gen: IdGenerator,
}

impl MemoryStore {
    /// Create an empty store with no roles assigned.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_order: 1,
                ..Inner::default()
            }),
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a store bootstrapped with an initial Admin principal.
    ///
    /// Bootstrap is an operational concern outside the store contract;
    /// further role changes go through [`GalleryStore::assign_role`].
    #[must_use]
    pub fn with_admin(admin: Principal) -> Self {
        let mut roles = HashMap::new();
        roles.insert(admin, Role::Admin);
        Self {
            inner: RwLock::new(Inner {
                roles,
                next_order: 1,
                ..Inner::default()
            }),
            id_gen: IdGenerator::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GalleryStore for MemoryStore {
    async fn list_entries(&self) -> AppResult<Vec<GalleryEntry>> {
        Ok(self.inner.read().await.entries.clone())
    }

    async fn create_entry(
        &self,
        caller: &Principal,
        media: ContentRef,
        title: &str,
        description: &str,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_admin(caller)?;

        // The store is the final arbiter of the media type, whatever the
        // client checked first.
        if !is_allowed_content_type(&media.content_type) {
            return Err(AppError::InvalidArgument(format!(
                "Unsupported content type: {}",
                media.content_type
            )));
        }

        let entry = GalleryEntry {
            id: self.id_gen.generate(),
            title: title.to_string(),
            description: description.to_string(),
            media,
            sort_order: inner.next_order,
            created_at: Utc::now(),
        };
        info!(id = %entry.id, order = entry.sort_order, "created gallery entry");
        inner.next_order += 1;
        inner.entries.push(entry);
        Ok(())
    }

    async fn update_entry(
        &self,
        caller: &Principal,
        id: &str,
        title: &str,
        description: &str,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_admin(caller)?;

        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Gallery entry: {id}")))?;
        entry.title = title.to_string();
        entry.description = description.to_string();
        Ok(())
    }

    async fn delete_entry(&self, caller: &Principal, id: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_admin(caller)?;

        // Survivors keep their sort_order; gaps are meaningless.
        let position = inner
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Gallery entry: {id}")))?;
        inner.entries.remove(position);
        info!(id = %id, "deleted gallery entry");
        Ok(())
    }

    async fn reorder_entries(&self, caller: &Principal, ids: &[String]) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_admin(caller)?;

        let mut submitted: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut existing: Vec<&str> = inner.entries.iter().map(|e| e.id.as_str()).collect();
        submitted.sort_unstable();
        existing.sort_unstable();
        if submitted != existing {
            return Err(AppError::InvalidArgument(
                "submitted id set does not match the existing entries".to_string(),
            ));
        }

        let mut by_id: HashMap<String, GalleryEntry> = inner
            .entries
            .drain(..)
            .map(|e| (e.id.clone(), e))
            .collect();
        let mut reordered = Vec::with_capacity(ids.len());
        for (position, id) in ids.iter().enumerate() {
            if let Some(mut entry) = by_id.remove(id) {
                entry.sort_order = position as i64 + 1;
                reordered.push(entry);
            }
        }
        inner.next_order = reordered.len() as i64 + 1;
        inner.entries = reordered;
        debug!(count = ids.len(), "accepted full reorder");
        Ok(())
    }

    async fn current_role(&self, caller: Option<&Principal>) -> AppResult<Role> {
        let inner = self.inner.read().await;
        Ok(caller
            .and_then(|principal| inner.roles.get(principal).copied())
            .unwrap_or_default())
    }

    async fn assign_role(&self, caller: &Principal, user: &Principal, role: Role) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_admin(caller)?;
        info!(user = %user, role = %role, "assigned role");
        inner.roles.insert(user.clone(), role);
        Ok(())
    }

    async fn current_admin(&self) -> AppResult<Principal> {
        let inner = self.inner.read().await;
        inner
            .roles
            .iter()
            .find(|(_, role)| role.is_admin())
            .map(|(principal, _)| principal.clone())
            .ok_or_else(|| AppError::NotFound("No admin assigned".to_string()))
    }

    async fn get_profile(&self, user: &Principal) -> AppResult<Option<UserProfile>> {
        Ok(self.inner.read().await.profiles.get(user).cloned())
    }

    async fn save_profile(&self, caller: &Principal, profile: UserProfile) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.profiles.insert(caller.clone(), profile);
        Ok(())
    }
}
