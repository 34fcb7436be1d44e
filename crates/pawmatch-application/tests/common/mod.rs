//! Shared test doubles for the application layer.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pawmatch_core::catalog::{CatalogApi, Dog, DogId, Location, MatchResult, SearchPage, SearchQuery};
use pawmatch_core::session::Credentials;
use pawmatch_core::{PawError, Result};
use pawmatch_infrastructure::InMemoryKeyValueStore;

/// Scriptable in-memory catalog service.
///
/// Search results are derived from the query offset: page `from` returns the
/// ids `dog-{from}` and `dog-{from + 1}` (empty when `total` is zero).
/// Detail batches come back in reverse order to exercise reordering.
pub struct MockCatalog {
    pub session_valid: AtomicBool,
    pub fail_login: AtomicBool,
    pub fail_logout: AtomicBool,
    pub fail_search: AtomicBool,
    pub fail_match: AtomicBool,
    pub total: Mutex<u64>,
    /// Per-offset delay before a search answers
    pub search_delays: Mutex<HashMap<u64, Duration>>,
    pub match_delay: Mutex<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            session_valid: AtomicBool::new(false),
            fail_login: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            fail_search: AtomicBool::new(false),
            fail_match: AtomicBool::new(false),
            total: Mutex::new(100),
            search_delays: Mutex::new(HashMap::new()),
            match_delay: Mutex::new(Duration::ZERO),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_valid_session() -> Self {
        let mock = Self::new();
        mock.session_valid.store(true, Ordering::SeqCst);
        mock
    }

    pub fn set_session_valid(&self, valid: bool) {
        self.session_valid.store(valid, Ordering::SeqCst);
    }

    pub fn set_total(&self, total: u64) {
        *self.total.lock().unwrap() = total;
    }

    pub fn delay_search(&self, from: u64, delay: Duration) {
        self.search_delays.lock().unwrap().insert(from, delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    fn record(&self, operation: &str) {
        self.calls.lock().unwrap().push(operation.to_string());
    }
}

pub fn dog(id: &str) -> Dog {
    Dog {
        id: id.to_string(),
        img: format!("https://img.example/{}.jpg", id),
        name: format!("Name of {}", id),
        age: 3,
        zip_code: "02139".to_string(),
        breed: "Beagle".to_string(),
    }
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn login(&self, _credentials: &Credentials) -> Result<()> {
        self.record("login");
        if self.fail_login.load(Ordering::SeqCst) {
            return Err(PawError::Authentication("401 Unauthorized".into()));
        }
        self.set_session_valid(true);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.record("logout");
        self.set_session_valid(false);
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(PawError::Network("connection reset".into()));
        }
        Ok(())
    }

    async fn breeds(&self) -> Result<Vec<String>> {
        self.record("breeds");
        if !self.session_valid.load(Ordering::SeqCst) {
            return Err(PawError::Authentication("401 Unauthorized".into()));
        }
        Ok(vec!["Akita".into(), "Beagle".into(), "Pug".into()])
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.record("search");
        let delay = self.search_delays.lock().unwrap().get(&query.from).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(PawError::service(500, "search unavailable"));
        }

        let total = *self.total.lock().unwrap();
        let result_ids = if total == 0 {
            Vec::new()
        } else {
            vec![format!("dog-{}", query.from), format!("dog-{}", query.from + 1)]
        };
        Ok(SearchPage {
            result_ids,
            total,
            next: None,
            prev: None,
        })
    }

    async fn dogs(&self, ids: &[DogId]) -> Result<Vec<Dog>> {
        self.record("dogs");
        Ok(ids.iter().rev().map(|id| dog(id)).collect())
    }

    async fn generate_match(&self, ids: &[DogId]) -> Result<MatchResult> {
        self.record("match");
        let delay = *self.match_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_match.load(Ordering::SeqCst) {
            return Err(PawError::service(503, "match unavailable"));
        }
        let matched_id = ids
            .first()
            .cloned()
            .ok_or_else(|| PawError::service(400, "empty id list"))?;
        Ok(MatchResult { matched_id })
    }

    async fn locations(&self, zip_codes: &[String]) -> Result<Vec<Location>> {
        self.record("locations");
        Ok(zip_codes
            .iter()
            .map(|zip| Location {
                zip_code: zip.clone(),
                latitude: 42.36,
                longitude: -71.09,
                city: "Cambridge".into(),
                state: "MA".into(),
                county: "Middlesex".into(),
            })
            .collect())
    }
}

pub fn store() -> Arc<InMemoryKeyValueStore> {
    Arc::new(InMemoryKeyValueStore::new())
}
