//! Result caching shared by the search loaders.

mod query_cache;

pub use query_cache::QueryCache;
