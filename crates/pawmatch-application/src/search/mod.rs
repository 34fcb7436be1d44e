//! Search use cases.
//!
//! - `state`: filter, page and favorite state with write-through persistence
//! - `results`: cached page and detail loading for the current state

mod results;
mod state;

pub use results::{ResultsStatus, ResultsView, SearchResults};
pub use state::SearchStateEngine;
