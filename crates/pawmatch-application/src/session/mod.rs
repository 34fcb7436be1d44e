//! Session use cases.

mod manager;

pub use manager::{DEFAULT_REVALIDATE_INTERVAL, SessionManager};
