//! FetchApiClient - REST implementation of the catalog service contract.
//!
//! Session credentials travel as an HTTP-only cookie set by `/auth/login`;
//! the client keeps it in reqwest's cookie jar and attaches it to every call.

use std::time::Duration;

use async_trait::async_trait;
use pawmatch_core::catalog::{CatalogApi, Dog, DogId, Location, MatchResult, SearchPage, SearchQuery};
use pawmatch_core::config::ClientConfig;
use pawmatch_core::session::Credentials;
use pawmatch_core::{PawError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Catalog client over HTTP with a per-instance cookie jar.
#[derive(Clone)]
pub struct FetchApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl FetchApiClient {
    /// Creates a client for `base_url` with its own cookie store.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| PawError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and maps transport and status failures.
    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.timeout(self.timeout).send().await.map_err(|e| {
            tracing::debug!("[FetchApi] {} transport failure: {}", operation, e);
            PawError::Network(format!("{} request failed: {}", operation, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::debug!("[FetchApi] {} returned {}: {}", operation, status, body);
        Err(status_error(operation, status, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T> {
        let response = self.send(operation, request).await?;
        response.json::<T>().await.map_err(|e| PawError::Serialization {
            format: "JSON".to_string(),
            message: format!("Failed to parse {} response: {}", operation, e),
        })
    }
}

/// Maps a non-success status to the error taxonomy.
fn status_error(operation: &str, status: StatusCode, body: String) -> PawError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PawError::Authentication(format!("{} rejected ({})", operation, status))
        }
        _ => PawError::service(status.as_u16(), body),
    }
}

#[async_trait]
impl CatalogApi for FetchApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<()> {
        let request = self.client.post(self.url("/auth/login")).json(credentials);
        self.send("login", request).await?;
        tracing::info!("[FetchApi] Logged in as {}", credentials.email);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let request = self.client.post(self.url("/auth/logout"));
        self.send("logout", request).await?;
        Ok(())
    }

    async fn breeds(&self) -> Result<Vec<String>> {
        let request = self.client.get(self.url("/dogs/breeds"));
        self.send_json("breeds", request).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let request = self
            .client
            .get(self.url("/dogs/search"))
            .query(&query.to_pairs());
        let page: SearchPage = self.send_json("search", request).await?;
        tracing::debug!(
            "[FetchApi] search from={} size={} -> {} ids of {}",
            query.from,
            query.size,
            page.result_ids.len(),
            page.total
        );
        Ok(page)
    }

    async fn dogs(&self, ids: &[DogId]) -> Result<Vec<Dog>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = self.client.post(self.url("/dogs")).json(ids);
        self.send_json("dogs", request).await
    }

    async fn generate_match(&self, ids: &[DogId]) -> Result<MatchResult> {
        let request = self.client.post(self.url("/dogs/match")).json(ids);
        self.send_json("match", request).await
    }

    async fn locations(&self, zip_codes: &[String]) -> Result<Vec<Location>> {
        if zip_codes.is_empty() {
            return Ok(Vec::new());
        }
        let request = self.client.post(self.url("/locations")).json(zip_codes);
        // The service answers `null` for unknown ZIP codes
        let locations: Vec<Option<Location>> = self.send_json("locations", request).await?;
        Ok(locations.into_iter().flatten().collect())
    }
}
