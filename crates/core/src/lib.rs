//! Core services for the vitrine gallery subsystem.

pub mod services;

pub use services::*;
