//! Application layer for PawMatch.
//!
//! Use cases that coordinate the catalog client and client storage:
//! session lifecycle, search state, cached result loading and match
//! generation.

pub mod cache;
pub mod match_orchestrator;
pub mod search;
pub mod session;

pub use cache::QueryCache;
pub use match_orchestrator::{MATCH_SELECTION_ERROR, MatchOrchestrator};
pub use search::{ResultsStatus, ResultsView, SearchResults, SearchStateEngine};
pub use session::SessionManager;
