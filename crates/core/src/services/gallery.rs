//! Gallery facade composing the services.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

use vitrine_common::config::ViewerConfig;
use vitrine_common::{AppError, AppResult, Config, MediaStorage, ProgressFn};
use vitrine_store::{
    GalleryEntry, GalleryStore, IdentityProvider, Principal, Role, UserProfile,
};

use crate::services::auth::{AuthService, AuthState, Session};
use crate::services::cache::GalleryCache;
use crate::services::reorder::{Direction, ReorderService};
use crate::services::upload::{UploadRequest, UploadService};
use crate::services::viewer::{Slideshow, SwipeTracker};

/// The gallery subsystem wired together.
///
/// Reads go through the cache; every mutation passes the authorization
/// guard, reaches the store, and invalidates the cache on success.
///
/// While a mutation is in flight, [`GalleryService::busy`] is true. The
/// subsystem does not serialize overlapping mutations from one session —
/// the presentation host must disable its mutation controls whenever
/// `busy()` reports true.
pub struct GalleryService {
    auth: Arc<AuthService>,
    cache: Arc<GalleryCache>,
    upload: UploadService,
    reorder: ReorderService,
    store: Arc<dyn GalleryStore>,
    media: Arc<dyn MediaStorage>,
    viewer_config: ViewerConfig,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the mutation scope ends.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl GalleryService {
    /// Wire the subsystem over its external collaborators.
    #[must_use]
    pub fn new(
        config: &Config,
        store: Arc<dyn GalleryStore>,
        media: Arc<dyn MediaStorage>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(identity, store.clone()));
        let cache = Arc::new(GalleryCache::new(store.clone()));
        let upload = UploadService::new(
            auth.clone(),
            store.clone(),
            media.clone(),
            cache.clone(),
            config.upload.clone(),
        );
        let reorder = ReorderService::new(auth.clone(), store.clone(), cache.clone());

        Self {
            auth,
            cache,
            upload,
            reorder,
            store,
            media,
            viewer_config: config.viewer.clone(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    fn begin_mutation(&self) -> BusyGuard {
        self.busy.store(true, Ordering::SeqCst);
        BusyGuard(self.busy.clone())
    }

    /// Whether a mutation is currently in flight.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    // === Session ===

    /// Establish a session. See [`AuthService::login`].
    pub async fn login(&self) -> AppResult<Session> {
        self.auth.login().await
    }

    /// Destroy the session and drop all cached content state.
    pub async fn logout(&self) {
        self.auth.logout().await;
        self.cache.notify_changed().await;
        info!("session cleared");
    }

    /// Current authentication state.
    pub async fn auth_state(&self) -> AuthState {
        self.auth.state().await
    }

    /// Principal of the active session, if any.
    pub async fn principal(&self) -> Option<Principal> {
        self.auth.principal().await
    }

    /// Role of the caller, fail-closed to Guest.
    pub async fn current_role(&self) -> Role {
        self.auth.current_role().await
    }

    // === Reads ===

    /// Ordered entry list, served from the cache when fresh.
    pub async fn entries(&self) -> AppResult<Vec<GalleryEntry>> {
        self.cache.entries().await
    }

    /// Directly retrievable URL for an entry's content.
    #[must_use]
    pub fn direct_url(&self, entry: &GalleryEntry) -> String {
        self.media.direct_url(&entry.media)
    }

    /// Build a slideshow over the current entry list, configured with the
    /// viewer's auto-advance interval.
    pub async fn slideshow(&self, now: Instant) -> AppResult<Slideshow> {
        let entries = self.entries().await?;
        Ok(Slideshow::new(
            entries,
            Duration::from_secs(self.viewer_config.advance_interval_secs),
            now,
        ))
    }

    /// Swipe tracker configured with the viewer's distance threshold.
    #[must_use]
    pub fn swipe_tracker(&self) -> SwipeTracker {
        SwipeTracker::new(self.viewer_config.swipe_threshold_px)
    }

    // === Mutations (Admin) ===

    /// Upload new content and create its entry. See [`UploadService`].
    pub async fn upload(&self, request: UploadRequest, on_progress: &ProgressFn<'_>) -> AppResult<()> {
        let _busy = self.begin_mutation();
        self.upload.upload(request, on_progress).await
    }

    /// Update an entry's title and description.
    pub async fn update_entry(&self, id: &str, title: &str, description: &str) -> AppResult<()> {
        let _busy = self.begin_mutation();
        let caller = self.auth.require_admin().await?;
        self.store
            .update_entry(&caller, id, title, description)
            .await?;
        self.cache.notify_changed().await;
        Ok(())
    }

    /// Delete an entry.
    pub async fn delete_entry(&self, id: &str) -> AppResult<()> {
        let _busy = self.begin_mutation();
        let caller = self.auth.require_admin().await?;
        self.store.delete_entry(&caller, id).await?;
        self.cache.notify_changed().await;
        Ok(())
    }

    /// Move the entry at `index` one position. See
    /// [`ReorderService::move_entry`].
    pub async fn move_entry(&self, index: usize, direction: Direction) -> AppResult<bool> {
        let _busy = self.begin_mutation();
        self.reorder.move_entry(index, direction).await
    }

    /// Assign a role to a principal.
    pub async fn assign_role(&self, user: &Principal, role: Role) -> AppResult<()> {
        let caller = self.auth.require_admin().await?;
        self.store.assign_role(&caller, user, role).await
    }

    /// The principal currently holding Admin.
    pub async fn current_admin(&self) -> AppResult<Principal> {
        self.store.current_admin().await
    }

    // === Profiles ===

    /// The active session's display profile.
    pub async fn my_profile(&self) -> AppResult<Option<UserProfile>> {
        let Some(principal) = self.auth.principal().await else {
            return Err(AppError::AuthenticationRequired);
        };
        self.store.get_profile(&principal).await
    }

    /// Save the active session's display profile.
    pub async fn save_profile(&self, profile: UserProfile) -> AppResult<()> {
        let Some(principal) = self.auth.principal().await else {
            return Err(AppError::AuthenticationRequired);
        };
        self.store.save_profile(&principal, profile).await
    }
}
