//! Catalog domain module.
//!
//! Models and the request contract of the remote catalog service.

mod api;
mod model;
mod query;

pub use api::CatalogApi;
pub use model::{Dog, DogId, Location, MatchResult, SearchPage};
pub use query::SearchQuery;
