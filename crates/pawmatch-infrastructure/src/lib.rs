//! Infrastructure layer for PawMatch.
//!
//! File-system backed implementations of the core storage contract, path
//! resolution, and configuration loading.

pub mod config_service;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::PawPaths;
pub use crate::storage::{InMemoryKeyValueStore, TomlKeyValueStore};
