//! Favorite set used as the candidate pool for match generation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::DogId;

/// Holds at most one dog id.
///
/// Toggling when empty adds the id; toggling when non-empty clears the set,
/// whichever id was toggled. A second selection therefore collapses the set
/// back to empty instead of replacing the current favorite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<DogId>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str) {
        if self.0.is_empty() {
            self.0.insert(id.to_string());
        } else {
            self.0.clear();
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids in ascending order, as sent to the match endpoint.
    pub fn ids(&self) -> Vec<DogId> {
        self.0.iter().cloned().collect()
    }

    /// Rebuilds a set from stored ids, keeping only the first one.
    pub fn from_stored(ids: Vec<DogId>) -> Self {
        Self(ids.into_iter().take(1).collect())
    }
}
