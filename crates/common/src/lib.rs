//! Common utilities and shared types for vitrine.
//!
//! This crate provides foundational components used across all vitrine crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Media storage**: Binary content collaborators via [`MediaStorage`]
//!
//! # Example
//!
//! ```no_run
//! use vitrine_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::{Config, StoreConfig, UploadConfig, ViewerConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{
    ContentRef, LocalMediaStorage, MediaStorage, MemoryMediaStorage, ProgressFn, content_key,
};
