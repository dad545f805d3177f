//! End-to-end gallery behavior over the in-memory collaborators.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;

use vitrine_common::{AppError, AppResult, Config, ContentRef, MemoryMediaStorage};
use vitrine_core::{Direction, GalleryService, UploadRequest};
use vitrine_store::{
    GalleryEntry, GalleryStore, LocalIdentity, MemoryStore, Principal, Role, UserProfile,
};

const ADMIN: &str = "admin-principal";

/// Store wrapper that counts calls, to observe when the services really
/// reach the backend.
struct CountingStore {
    inner: MemoryStore,
    list_calls: AtomicUsize,
    reorder_calls: AtomicUsize,
}

impl CountingStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            list_calls: AtomicUsize::new(0),
            reorder_calls: AtomicUsize::new(0),
        }
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn reorder_calls(&self) -> usize {
        self.reorder_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GalleryStore for CountingStore {
    async fn list_entries(&self) -> AppResult<Vec<GalleryEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_entries().await
    }

    async fn create_entry(
        &self,
        caller: &Principal,
        media: ContentRef,
        title: &str,
        description: &str,
    ) -> AppResult<()> {
        self.inner
            .create_entry(caller, media, title, description)
            .await
    }

    async fn update_entry(
        &self,
        caller: &Principal,
        id: &str,
        title: &str,
        description: &str,
    ) -> AppResult<()> {
        self.inner.update_entry(caller, id, title, description).await
    }

    async fn delete_entry(&self, caller: &Principal, id: &str) -> AppResult<()> {
        self.inner.delete_entry(caller, id).await
    }

    async fn reorder_entries(&self, caller: &Principal, ids: &[String]) -> AppResult<()> {
        self.reorder_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.reorder_entries(caller, ids).await
    }

    async fn current_role(&self, caller: Option<&Principal>) -> AppResult<Role> {
        self.inner.current_role(caller).await
    }

    async fn assign_role(&self, caller: &Principal, user: &Principal, role: Role) -> AppResult<()> {
        self.inner.assign_role(caller, user, role).await
    }

    async fn current_admin(&self) -> AppResult<Principal> {
        self.inner.current_admin().await
    }

    async fn get_profile(&self, user: &Principal) -> AppResult<Option<UserProfile>> {
        self.inner.get_profile(user).await
    }

    async fn save_profile(&self, caller: &Principal, profile: UserProfile) -> AppResult<()> {
        self.inner.save_profile(caller, profile).await
    }
}

struct Harness {
    store: Arc<CountingStore>,
    media: Arc<MemoryMediaStorage>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: Arc::new(CountingStore::new(MemoryStore::with_admin(Principal::from(
                ADMIN,
            )))),
            media: Arc::new(MemoryMediaStorage::new().with_chunk_size(4)),
        }
    }

    /// A gallery client whose identity provider authenticates as
    /// `principal`.
    fn client(&self, principal: &str) -> GalleryService {
        GalleryService::new(
            &Config::default(),
            self.store.clone(),
            self.media.clone(),
            Arc::new(LocalIdentity::with_principal(Principal::from(principal))),
        )
    }
}

fn png_upload(title: &str) -> UploadRequest {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(title.as_bytes());
    UploadRequest {
        data: Bytes::from(data),
        content_type: "image/png".to_string(),
        title: Some(title.to_string()),
        description: None,
    }
}

async fn seed(gallery: &GalleryService, titles: &[&str]) {
    for title in titles {
        gallery
            .upload(png_upload(title), &|_| {})
            .await
            .unwrap_or_else(|err| panic!("seeding {title} failed: {err}"));
    }
}

fn titles(entries: &[GalleryEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.title.as_str()).collect()
}

#[tokio::test]
async fn create_and_delete_yield_the_surviving_ordered_set() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();

    seed(&gallery, &["a", "b", "c"]).await;

    let entries = gallery.entries().await.unwrap();
    assert_eq!(titles(&entries), ["a", "b", "c"]);
    assert!(entries.windows(2).all(|w| w[0].sort_order < w[1].sort_order));

    gallery.delete_entry(&entries[1].id).await.unwrap();

    let after = gallery.entries().await.unwrap();
    assert_eq!(titles(&after), ["a", "c"]);
    assert_eq!(after[0].id, entries[0].id);
    assert_eq!(after[1].id, entries[2].id);
    assert!(after[0].sort_order < after[1].sort_order);
}

#[tokio::test]
async fn move_up_swaps_adjacent_entries() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();
    seed(&gallery, &["a", "b", "c"]).await;

    let moved = gallery.move_entry(1, Direction::Up).await.unwrap();
    assert!(moved);
    assert_eq!(titles(&gallery.entries().await.unwrap()), ["b", "a", "c"]);
}

#[tokio::test]
async fn non_admin_move_is_denied_and_changes_nothing() {
    let harness = Harness::new();
    let admin = harness.client(ADMIN);
    admin.login().await.unwrap();
    seed(&admin, &["a", "b", "c"]).await;

    let viewer = harness.client("bystander");
    viewer.login().await.unwrap();

    let err = viewer.move_entry(1, Direction::Up).await.unwrap_err();
    assert!(matches!(err, AppError::AuthorizationDenied(_)));
    assert_eq!(titles(&viewer.entries().await.unwrap()), ["a", "b", "c"]);
}

#[tokio::test]
async fn boundary_moves_issue_no_store_call() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();
    seed(&gallery, &["a", "b", "c"]).await;

    assert!(!gallery.move_entry(0, Direction::Up).await.unwrap());
    assert!(!gallery.move_entry(2, Direction::Down).await.unwrap());
    assert_eq!(harness.store.reorder_calls(), 0);

    assert!(gallery.move_entry(1, Direction::Up).await.unwrap());
    assert_eq!(harness.store.reorder_calls(), 1);
}

#[tokio::test]
async fn out_of_range_move_is_rejected() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();
    seed(&gallery, &["a"]).await;

    let err = gallery.move_entry(5, Direction::Down).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert_eq!(harness.store.reorder_calls(), 0);
}

#[tokio::test]
async fn upload_progress_is_monotonic_and_completes_once() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();

    let seen = Mutex::new(Vec::new());
    gallery
        .upload(png_upload("sunset"), &|pct| {
            seen.lock().unwrap().push(pct);
        })
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen.first().unwrap(), 0);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.iter().filter(|&&pct| pct == 100).count(), 1);
    assert_eq!(*seen.last().unwrap(), 100);

    let entries = gallery.entries().await.unwrap();
    assert_eq!(titles(&entries), ["sunset"]);
}

#[tokio::test]
async fn rejected_upload_never_reports_completion_and_creates_nothing() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();

    let seen = Mutex::new(Vec::new());
    let request = UploadRequest {
        content_type: "image/gif".to_string(),
        ..png_upload("bad")
    };
    let err = gallery
        .upload(request, &|pct| seen.lock().unwrap().push(pct))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert!(!seen.lock().unwrap().contains(&100));
    assert!(gallery.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_without_session_requires_authentication() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);

    let err = gallery.upload(png_upload("x"), &|_| {}).await.unwrap_err();
    assert!(matches!(err, AppError::AuthenticationRequired));
}

#[tokio::test]
async fn guest_upload_is_denied() {
    let harness = Harness::new();
    let gallery = harness.client("visitor");
    gallery.login().await.unwrap();

    let err = gallery.upload(png_upload("x"), &|_| {}).await.unwrap_err();
    assert!(matches!(err, AppError::AuthorizationDenied(_)));
    assert!(gallery.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn untitled_upload_gets_the_placeholder_title() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();

    let request = UploadRequest {
        title: None,
        ..png_upload("ignored")
    };
    gallery.upload(request, &|_| {}).await.unwrap();

    let entries = gallery.entries().await.unwrap();
    assert_eq!(entries[0].title, "Untitled");
    assert_eq!(entries[0].description, "");
}

#[tokio::test]
async fn reads_are_cached_until_a_mutation_invalidates() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();
    seed(&gallery, &["a"]).await;

    let baseline = harness.store.list_calls();
    gallery.entries().await.unwrap();
    gallery.entries().await.unwrap();
    assert_eq!(harness.store.list_calls(), baseline + 1);

    let id = gallery.entries().await.unwrap()[0].id.clone();
    gallery.update_entry(&id, "renamed", "desc").await.unwrap();
    let entries = gallery.entries().await.unwrap();
    assert_eq!(harness.store.list_calls(), baseline + 2);
    assert_eq!(entries[0].title, "renamed");
}

#[tokio::test]
async fn logout_drops_the_cached_snapshot_and_the_session() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();
    seed(&gallery, &["a"]).await;
    gallery.entries().await.unwrap();

    let baseline = harness.store.list_calls();
    gallery.logout().await;
    assert_eq!(gallery.current_role().await, Role::Guest);

    gallery.entries().await.unwrap();
    assert_eq!(harness.store.list_calls(), baseline + 1);
}

#[tokio::test]
async fn busy_flag_is_set_while_a_mutation_is_in_flight() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();

    let observed_busy = AtomicBool::new(false);
    gallery
        .upload(png_upload("a"), &|_| {
            if gallery.busy() {
                observed_busy.store(true, Ordering::SeqCst);
            }
        })
        .await
        .unwrap();

    assert!(observed_busy.load(Ordering::SeqCst));
    assert!(!gallery.busy());
}

#[tokio::test]
async fn update_and_delete_of_unknown_ids_fail_not_found() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();

    let err = gallery.update_entry("missing", "t", "d").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = gallery.delete_entry("missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn slideshow_wraps_and_swipes_through_the_gallery() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();
    seed(&gallery, &["a", "b", "c"]).await;

    let now = Instant::now();
    let mut show = gallery.slideshow(now).await.unwrap();
    assert_eq!(show.len(), 3);

    for _ in 0..3 {
        show.next(now);
    }
    assert_eq!(show.index(), 0);

    let mut tracker = gallery.swipe_tracker();
    tracker.touch_start(300.0);
    tracker.touch_move(280.0);
    assert_eq!(tracker.touch_end(), None);

    tracker.touch_start(300.0);
    tracker.touch_move(100.0);
    let action = tracker.touch_end().unwrap();
    show.apply_swipe(action, now);
    assert_eq!(show.index(), 1);

    assert!(show.poll(now + Duration::from_secs(10)));
    assert_eq!(show.index(), 2);
}

#[tokio::test]
async fn empty_gallery_presents_the_no_content_state() {
    let harness = Harness::new();
    let gallery = harness.client("visitor");

    let show = gallery.slideshow(Instant::now()).await.unwrap();
    assert!(show.is_empty());
    assert!(show.current().is_none());
}

#[tokio::test]
async fn roles_and_profiles_round_trip() {
    let harness = Harness::new();
    let admin = harness.client(ADMIN);
    admin.login().await.unwrap();

    assert_eq!(
        admin.current_admin().await.unwrap(),
        Principal::from(ADMIN)
    );

    admin
        .assign_role(&Principal::from("bob"), Role::User)
        .await
        .unwrap();

    let bob = harness.client("bob");
    bob.login().await.unwrap();
    assert_eq!(bob.current_role().await, Role::User);

    assert_eq!(bob.my_profile().await.unwrap(), None);
    bob.save_profile(UserProfile {
        name: "Bob".to_string(),
    })
    .await
    .unwrap();
    assert_eq!(
        bob.my_profile().await.unwrap(),
        Some(UserProfile {
            name: "Bob".to_string()
        })
    );

    // A User still cannot mutate the gallery.
    let err = bob.delete_entry("anything").await.unwrap_err();
    assert!(matches!(err, AppError::AuthorizationDenied(_)));
}

#[tokio::test]
async fn retried_uploads_are_not_deduplicated() {
    let harness = Harness::new();
    let gallery = harness.client(ADMIN);
    gallery.login().await.unwrap();

    gallery.upload(png_upload("same"), &|_| {}).await.unwrap();
    gallery.upload(png_upload("same"), &|_| {}).await.unwrap();

    let entries = gallery.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_ne!(entries[0].id, entries[1].id);
    // The content-addressed blob may be shared; the entries are not.
    assert_eq!(entries[0].media, entries[1].media);
}
