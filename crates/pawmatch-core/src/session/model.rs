//! Session domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PawError, Result};
use crate::validation::{EMAIL_ERROR, NAME_ERROR, is_valid_email, is_valid_name};

/// Identity presented to the remote service at login.
///
/// Holding credentials is not proof of a live session; validity is tracked
/// separately on [`SessionSnapshot::authenticated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub name: String,
    pub email: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Checks name then email syntax, reporting the first bad field.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_name(&self.name) {
            return Err(PawError::validation("name", NAME_ERROR));
        }
        if !is_valid_email(&self.email) {
            return Err(PawError::validation("email", EMAIL_ERROR));
        }
        Ok(())
    }
}

/// Top-level view the client should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Route {
    /// Unauthenticated entry point (login form)
    #[default]
    Entry,
    /// Protected search view
    Search,
}

/// Outcome of guarding a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Initial session check still in flight; render a neutral loading state
    Loading,
    Granted,
    /// Send the user back to the entry point
    Redirect,
}

/// The client's current belief about its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub credentials: Option<Credentials>,
    pub is_loading_initial_check: bool,
    pub route: Route,
    pub last_validated_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// State before the first validation has resolved.
    pub fn initial() -> Self {
        Self {
            authenticated: false,
            credentials: None,
            is_loading_initial_check: true,
            route: Route::Entry,
            last_validated_at: None,
        }
    }

    pub fn access(&self) -> Access {
        if self.is_loading_initial_check {
            Access::Loading
        } else if self.authenticated {
            Access::Granted
        } else {
            Access::Redirect
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
