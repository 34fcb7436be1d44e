//! Remote catalog service contract.

use async_trait::async_trait;

use crate::catalog::{Dog, DogId, Location, MatchResult, SearchPage, SearchQuery};
use crate::error::Result;
use crate::session::Credentials;

/// Typed access to the remote catalog service.
///
/// Implementations carry the session cookie on every call and apply no retry
/// policy of their own. Every method is a suspension point; callers must not
/// hold state locks across them.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Establishes the session cookie.
    async fn login(&self, credentials: &Credentials) -> Result<()>;

    /// Invalidates the session cookie.
    async fn logout(&self) -> Result<()>;

    /// Full breed vocabulary, in service order.
    async fn breeds(&self) -> Result<Vec<String>>;

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage>;

    /// Detail records for `ids`. The response order is not guaranteed to
    /// match the request order.
    async fn dogs(&self, ids: &[DogId]) -> Result<Vec<Dog>>;

    /// Picks a single winner from the candidate ids.
    async fn generate_match(&self, ids: &[DogId]) -> Result<MatchResult>;

    async fn locations(&self, zip_codes: &[String]) -> Result<Vec<Location>>;
}
