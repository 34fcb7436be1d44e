//! Search results loader.
//!
//! Resolves a [`PageKey`] into a page of ids and then into detail records,
//! both through [`QueryCache`]s, and publishes what the UI should show on a
//! `watch` channel. Only the most recently requested key may update the
//! view; responses for superseded keys are dropped.
//!
//! A stale page is shown at once while the cache refetches it; when that
//! refetch lands its details are resolved and the view is republished.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use pawmatch_core::Result;
use pawmatch_core::catalog::{CatalogApi, Dog, DogId, SearchPage, SearchQuery};
use pawmatch_core::search::PageKey;
use tokio::sync::watch;

use crate::cache::QueryCache;

/// Loading state of the results view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultsStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Banner-level message for the current key
    Failed(String),
}

/// Snapshot of the results view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsView {
    pub key: Option<PageKey>,
    pub status: ResultsStatus,
    pub page: Option<SearchPage>,
    /// Details in `page.result_ids` order
    pub dogs: Vec<Dog>,
}

impl ResultsView {
    pub fn is_loading(&self) -> bool {
        self.status == ResultsStatus::Loading
    }
}

pub struct SearchResults {
    inner: Arc<ResultsInner>,
}

struct ResultsInner {
    api: Arc<dyn CatalogApi>,
    pages: QueryCache<PageKey, SearchPage>,
    details: QueryCache<Vec<DogId>, Vec<Dog>>,
    breeds: QueryCache<(), Vec<String>>,
    current: Mutex<Option<PageKey>>,
    view: watch::Sender<ResultsView>,
}

impl SearchResults {
    pub fn new(api: Arc<dyn CatalogApi>, stale_time: Duration) -> Self {
        let (view, _) = watch::channel(ResultsView::default());
        Self {
            inner: Arc::new(ResultsInner {
                api,
                pages: QueryCache::new("pages", stale_time),
                details: QueryCache::new("details", stale_time),
                breeds: QueryCache::new("breeds", stale_time),
                current: Mutex::new(None),
                view,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultsView> {
        self.inner.view.subscribe()
    }

    pub fn view(&self) -> ResultsView {
        self.inner.view.borrow().clone()
    }

    /// The key most recently passed to [`SearchResults::load`].
    pub fn current_key(&self) -> Option<PageKey> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Loads `key` and makes it the current key.
    ///
    /// Returns `Ok(None)` when a newer key was requested before this one
    /// resolved; the view is left to the newer load. A stale page is
    /// returned as is and republished once its refetch completes.
    pub async fn load(&self, key: PageKey) -> Result<Option<ResultsView>> {
        let inner = &self.inner;
        {
            let mut current = inner.current.lock().unwrap_or_else(PoisonError::into_inner);
            *current = Some(key.clone());
            inner.view.send_replace(ResultsView {
                key: Some(key.clone()),
                status: ResultsStatus::Loading,
                page: inner.pages.peek(&key),
                dogs: Vec::new(),
            });
        }

        match inner.resolve(&key).await {
            Ok((page, dogs)) => {
                let published = inner.publish(&key, |view| {
                    view.status = ResultsStatus::Ready;
                    view.page = Some(page);
                    view.dogs = dogs;
                });
                if published.is_some() {
                    self.follow_refetch(key);
                }
                Ok(published)
            }
            Err(e) => {
                let message = e.user_message();
                if inner
                    .publish(&key, |view| view.status = ResultsStatus::Failed(message))
                    .is_none()
                {
                    return Ok(None);
                }
                tracing::warn!("[SearchResults] Load failed: {}", e);
                Err(e)
            }
        }
    }

    /// Drops the cached page for the current key and loads it again.
    pub async fn refresh(&self) -> Result<Option<ResultsView>> {
        let Some(key) = self.current_key() else {
            return Ok(None);
        };
        self.inner.pages.invalidate(&key);
        self.load(key).await
    }

    /// Breed vocabulary for the breed filter.
    pub async fn breeds(&self) -> Result<Vec<String>> {
        let api = Arc::clone(&self.inner.api);
        self.inner
            .breeds
            .fetch((), move || async move { api.breeds().await })
            .await
    }

    /// Forgets every cached page, detail batch and breed list.
    pub fn clear(&self) {
        let inner = &self.inner;
        inner.pages.clear();
        inner.details.clear();
        inner.breeds.clear();
        let mut current = inner.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = None;
        inner.view.send_replace(ResultsView::default());
    }

    /// Republishes `key` when the background refetch of its page resolves.
    fn follow_refetch(&self, key: PageKey) {
        let Some(refetch) = self.inner.pages.pending(&key) else {
            return;
        };
        let inner: Weak<ResultsInner> = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            let Ok(page) = refetch.await else {
                return;
            };
            let Some(inner) = inner.upgrade() else {
                return;
            };
            // An invalidated entry means a newer load owns the key
            if !inner.is_current(&key) || inner.pages.peek(&key).as_ref() != Some(&page) {
                return;
            }
            if inner.view.borrow().page.as_ref() == Some(&page) {
                return;
            }

            match inner.details_for(&page.result_ids).await {
                Ok(dogs) => {
                    if inner
                        .publish(&key, |view| {
                            view.status = ResultsStatus::Ready;
                            view.page = Some(page);
                            view.dogs = dogs;
                        })
                        .is_some()
                    {
                        tracing::debug!(
                            "[SearchResults] Republished page {} after refetch",
                            key.cursor.page()
                        );
                    }
                }
                Err(e) => {
                    tracing::debug!("[SearchResults] Details for refetched page failed: {}", e);
                }
            }
        });
    }
}

impl ResultsInner {
    async fn resolve(&self, key: &PageKey) -> Result<(SearchPage, Vec<Dog>)> {
        let api = Arc::clone(&self.api);
        let query = SearchQuery::from(key);
        let page = self
            .pages
            .fetch(key.clone(), move || async move { api.search(&query).await })
            .await?;

        if !self.is_current(key) {
            // Skip the detail request for a page nobody will see
            return Ok((page, Vec::new()));
        }

        let dogs = self.details_for(&page.result_ids).await?;
        Ok((page, dogs))
    }

    async fn details_for(&self, ids: &[DogId]) -> Result<Vec<Dog>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = ids.to_vec();
        batch.sort();
        batch.dedup();

        let api = Arc::clone(&self.api);
        let request = batch.clone();
        let fetched = self
            .details
            .fetch(batch, move || async move { api.dogs(&request).await })
            .await?;

        let mut by_id: HashMap<&str, &Dog> = fetched.iter().map(|d| (d.id.as_str(), d)).collect();
        Ok(ids
            .iter()
            .filter_map(|id| by_id.remove(id.as_str()).cloned())
            .collect())
    }

    fn is_current(&self, key: &PageKey) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            == Some(key)
    }

    /// Applies `update` to the view if `key` is still current.
    fn publish<F>(&self, key: &PageKey, update: F) -> Option<ResultsView>
    where
        F: FnOnce(&mut ResultsView),
    {
        // Held until the view is updated so a newer load cannot interleave
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref() != Some(key) {
            tracing::debug!(
                "[SearchResults] Dropping response for superseded page {}",
                key.cursor.page()
            );
            return None;
        }

        let mut published = None;
        self.view.send_modify(|view| {
            update(view);
            published = Some(view.clone());
        });
        published
    }
}
