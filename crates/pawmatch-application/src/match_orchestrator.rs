//! Match generation from the favorite set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pawmatch_core::catalog::{CatalogApi, Dog};
use pawmatch_core::search::FavoriteSet;
use pawmatch_core::{PawError, Result};

pub const MATCH_SELECTION_ERROR: &str = "Please select a dog to generate a match";

/// Runs one match request at a time: the match call, then a single-id detail
/// fetch for the winner.
pub struct MatchOrchestrator {
    api: Arc<dyn CatalogApi>,
    generating: AtomicBool,
}

/// Clears the in-progress flag however generation ends.
struct GeneratingGuard<'a>(&'a AtomicBool);

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl MatchOrchestrator {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            generating: AtomicBool::new(false),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Asks the service to pick one dog from `favorites` and resolves it.
    ///
    /// The favorite set itself is never modified.
    pub async fn generate_match(&self, favorites: &FavoriteSet) -> Result<Dog> {
        if favorites.is_empty() {
            return Err(PawError::validation("favorites", MATCH_SELECTION_ERROR));
        }

        if self.generating.swap(true, Ordering::SeqCst) {
            return Err(PawError::Busy("match generation".to_string()));
        }
        let _guard = GeneratingGuard(&self.generating);

        match self.request_match(favorites).await {
            Ok(dog) => {
                tracing::info!("[MatchOrchestrator] Matched with {} ({})", dog.name, dog.id);
                Ok(dog)
            }
            Err(e) => {
                tracing::warn!("[MatchOrchestrator] Match generation failed: {}", e);
                Err(PawError::MatchFailed(e.to_string()))
            }
        }
    }

    async fn request_match(&self, favorites: &FavoriteSet) -> Result<Dog> {
        let ids = favorites.ids();
        tracing::debug!("[MatchOrchestrator] Requesting match among {} favorite(s)", ids.len());

        let result = self.api.generate_match(&ids).await?;
        let matched_id = result.matched_id;

        self.api
            .dogs(std::slice::from_ref(&matched_id))
            .await?
            .into_iter()
            .find(|dog| dog.id == matched_id)
            .ok_or_else(|| PawError::not_found("dog", matched_id))
    }
}
