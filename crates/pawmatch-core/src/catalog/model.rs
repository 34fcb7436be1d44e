//! Catalog domain models.
//!
//! Shapes returned by the remote catalog service. Field names follow the
//! service's JSON (`resultIds`, `zip_code`, ...).

use serde::{Deserialize, Serialize};

/// Identifier of a dog in the remote catalog.
pub type DogId = String;

/// Detail record for a single adoptable dog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub id: DogId,
    pub img: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

/// One page of search results: ids only, details are fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub result_ids: Vec<DogId>,
    pub total: u64,
    /// Opaque continuation link for the following page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Opaque continuation link for the preceding page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.result_ids.is_empty()
    }
}

/// Winner selected by the remote match endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "match")]
    pub matched_id: DogId,
}

/// Geographic data for a ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
    pub county: String,
}
