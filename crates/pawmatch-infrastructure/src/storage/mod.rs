//! Storage implementations of the client key-value contract.

mod memory_store;
mod toml_document;
mod toml_store;

pub use memory_store::InMemoryKeyValueStore;
pub use toml_document::{DocumentError, TomlDocument};
pub use toml_store::TomlKeyValueStore;
