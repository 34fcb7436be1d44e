//! Session domain module.
//!
//! ```ignore
//! use pawmatch_core::session::{Credentials, SessionSnapshot, Access};
//! ```

mod model;

pub use model::{Access, Credentials, Route, SessionSnapshot};
