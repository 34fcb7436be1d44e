//! Search state engine: filter, page cursor, favorites and ZIP input.
//!
//! Every successful mutation is written through to the injected
//! [`KeyValueStore`] before returning. Validation failures write nothing.

use std::sync::Arc;

use pawmatch_core::catalog::{DogId, SearchQuery};
use pawmatch_core::search::{FavoriteSet, Filter, FilterUpdate, PageCursor, PageKey, total_pages};
use pawmatch_core::storage::{KeyValueStore, KeyValueStoreExt, PersistedKey};
use pawmatch_core::validation::{ZIP_ERROR, is_valid_zip_code};
use pawmatch_core::{PawError, Result};

/// Owns the search criteria of one authenticated session.
pub struct SearchStateEngine {
    store: Arc<dyn KeyValueStore>,
    filter: Filter,
    cursor: PageCursor,
    favorites: FavoriteSet,
    zip_input: String,
    zip_error: Option<String>,
}

impl SearchStateEngine {
    /// Engine with default state; nothing is read or written.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            filter: Filter::default(),
            cursor: PageCursor::FIRST,
            favorites: FavoriteSet::new(),
            zip_input: String::new(),
            zip_error: None,
        }
    }

    /// Rebuilds the engine from persisted state.
    ///
    /// Each key is restored independently; a missing, unreadable or invalid
    /// value falls back to its default.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let mut engine = Self::new(store);

        engine.filter = match engine.store.read_json::<Filter>(PersistedKey::SearchFilters) {
            Ok(Some(filter)) => filter.sanitized(),
            Ok(None) => Filter::default(),
            Err(e) => {
                tracing::warn!("[SearchState] Discarding stored filter: {}", e);
                Filter::default()
            }
        };

        engine.cursor = match engine.store.read_raw(PersistedKey::CurrentPage) {
            Ok(Some(raw)) => match raw.trim().parse::<u32>().map(PageCursor::new) {
                Ok(Ok(cursor)) => cursor,
                _ => {
                    tracing::warn!("[SearchState] Discarding stored page '{}'", raw);
                    PageCursor::FIRST
                }
            },
            Ok(None) => PageCursor::FIRST,
            Err(e) => {
                tracing::warn!("[SearchState] Failed to read stored page: {}", e);
                PageCursor::FIRST
            }
        };

        engine.favorites = match engine.store.read_json::<Vec<DogId>>(PersistedKey::Favorites) {
            Ok(Some(ids)) => FavoriteSet::from_stored(ids),
            Ok(None) => FavoriteSet::new(),
            Err(e) => {
                tracing::warn!("[SearchState] Discarding stored favorites: {}", e);
                FavoriteSet::new()
            }
        };

        engine.zip_input = match engine.store.read_raw(PersistedKey::ZipCode) {
            Ok(Some(zip)) if is_valid_zip_code(&zip) => zip,
            Ok(Some(zip)) => {
                tracing::warn!("[SearchState] Discarding stored ZIP code '{}'", zip);
                String::new()
            }
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!("[SearchState] Failed to read stored ZIP code: {}", e);
                String::new()
            }
        };

        tracing::debug!(
            "[SearchState] Restored page {} with {} breed(s), {} favorite(s)",
            engine.cursor.page(),
            engine.filter.breeds.len(),
            engine.favorites.len()
        );
        engine
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    /// Last ZIP code text entered, accepted or not.
    pub fn zip_input(&self) -> &str {
        &self.zip_input
    }

    /// Field error shown next to the ZIP input, if any.
    pub fn zip_error(&self) -> Option<&str> {
        self.zip_error.as_deref()
    }

    /// Merges a partial filter change and returns to the first page.
    pub fn update_filter(&mut self, update: FilterUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        let zip_change = update.zip_codes.is_some();
        let mut next = self.filter.clone();
        next.apply(update)?;

        self.filter = next;
        self.cursor = PageCursor::FIRST;
        tracing::debug!("[SearchState] Filter updated: {:?}", self.filter);

        self.persist_filter()?;
        self.persist_page()?;
        if zip_change {
            self.sync_zip_input()?;
        }
        Ok(())
    }

    /// Accepts a ZIP code from free-text input.
    ///
    /// Empty input drops the ZIP criterion. Invalid input only records the
    /// field error; the filter keeps its last valid value.
    pub fn set_zip_code(&mut self, input: &str) -> Result<()> {
        let input = input.trim();

        if input.is_empty() {
            self.zip_input.clear();
            self.zip_error = None;
            self.filter.zip_codes = None;
            self.cursor = PageCursor::FIRST;
            self.persist_filter()?;
            self.persist_page()?;
            return self.store.clear(PersistedKey::ZipCode);
        }

        if !is_valid_zip_code(input) {
            self.zip_input = input.to_string();
            self.zip_error = Some(ZIP_ERROR.to_string());
            return Err(PawError::validation("zipCode", ZIP_ERROR));
        }

        self.zip_input = input.to_string();
        self.zip_error = None;
        self.filter.zip_codes = Some(vec![input.to_string()]);
        self.cursor = PageCursor::FIRST;

        self.persist_filter()?;
        self.persist_page()?;
        self.store.write_raw(PersistedKey::ZipCode, input)
    }

    /// Moves to `page` without touching the filter.
    pub fn change_page(&mut self, page: u32) -> Result<()> {
        self.cursor = PageCursor::new(page)?;
        self.persist_page()
    }

    /// Resets filter, page and ZIP input. Favorites survive.
    pub fn clear_all(&mut self) -> Result<()> {
        self.filter = Filter::default();
        self.cursor = PageCursor::FIRST;
        self.zip_input.clear();
        self.zip_error = None;

        for key in PersistedKey::SEARCH {
            self.store.clear(key)?;
        }
        tracing::debug!("[SearchState] Cleared search state");
        Ok(())
    }

    /// Adds `id` to an empty favorite set, or empties a non-empty one.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<()> {
        self.favorites.toggle(id);
        self.persist_favorites()
    }

    pub fn clear_favorite(&mut self) -> Result<()> {
        self.favorites.clear();
        self.persist_favorites()
    }

    /// Page-cache key for the current state.
    pub fn page_key(&self) -> PageKey {
        PageKey::new(self.filter.clone(), self.cursor)
    }

    /// Remote query for the current state.
    pub fn query(&self) -> SearchQuery {
        SearchQuery::from(&self.page_key())
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total_pages(total, self.filter.page_size)
    }

    fn persist_filter(&self) -> Result<()> {
        self.store.write_json(PersistedKey::SearchFilters, &self.filter)
    }

    fn persist_page(&self) -> Result<()> {
        self.store
            .write_raw(PersistedKey::CurrentPage, &self.cursor.page().to_string())
    }

    /// Mirrors `filter.zip_codes` into the ZIP input and its stored key.
    ///
    /// The input holds a single code, so only the first one is kept there.
    fn sync_zip_input(&mut self) -> Result<()> {
        self.zip_error = None;
        match self.filter.zip_codes.as_ref().and_then(|zips| zips.first()) {
            Some(zip) => {
                self.zip_input = zip.clone();
                self.store.write_raw(PersistedKey::ZipCode, zip)
            }
            None => {
                self.zip_input.clear();
                self.store.clear(PersistedKey::ZipCode)
            }
        }
    }

    fn persist_favorites(&self) -> Result<()> {
        self.store.write_json(PersistedKey::Favorites, &self.favorites)
    }
}
