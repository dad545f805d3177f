//! Gallery domain model and the authoritative store boundary for vitrine.
//!
//! This crate defines what the rest of the system agrees on:
//!
//! - The entry, role, principal, and profile model
//! - The [`GalleryStore`] contract, with the in-process authoritative
//!   [`MemoryStore`] and the remote [`HttpStore`] client
//! - The [`IdentityProvider`] contract and the local [`LocalIdentity`]
//!
//! The store is always the ground truth for the entry set, its ordering,
//! and role assignments; clients only cache disposable projections of it.

pub mod entry;
pub mod http;
pub mod identity;
pub mod memory;
pub mod role;
pub mod store;

pub use entry::GalleryEntry;
pub use http::HttpStore;
pub use identity::{IdentityProvider, LocalIdentity};
pub use memory::MemoryStore;
pub use role::{Principal, Role, UserProfile};
pub use store::{ALLOWED_CONTENT_TYPES, GalleryStore, is_allowed_content_type};
