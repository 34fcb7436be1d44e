//! Domain layer for PawMatch.
//!
//! Models, validation, and the traits at the seams (`CatalogApi`,
//! `KeyValueStore`) that the application layer drives and the
//! infrastructure/interaction layers implement.

pub mod catalog;
pub mod config;
pub mod error;
pub mod search;
pub mod session;
pub mod storage;
pub mod validation;

// Re-export common error type
pub use error::{PawError, Result};
