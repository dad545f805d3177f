//! Gallery services.

pub mod auth;
pub mod cache;
pub mod gallery;
pub mod reorder;
pub mod upload;
pub mod viewer;

pub use auth::{AuthService, AuthState, Session};
pub use cache::GalleryCache;
pub use gallery::GalleryService;
pub use reorder::{Direction, ReorderService};
pub use upload::{DEFAULT_TITLE, UploadRequest, UploadService};
pub use viewer::{Slideshow, SwipeAction, SwipeTracker};
