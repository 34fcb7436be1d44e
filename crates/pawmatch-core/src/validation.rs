//! Input validation predicates.
//!
//! Pure syntax checks used before any state mutation or network call.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("invalid name pattern"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern"));
static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("invalid zip pattern"));

pub const NAME_ERROR: &str =
    "Please enter a valid name (letters, spaces, hyphens, and apostrophes only)";
pub const EMAIL_ERROR: &str = "Please enter a valid email address";
pub const ZIP_ERROR: &str = "Please enter a valid 5-digit ZIP code";

/// Letters, spaces, hyphens and apostrophes, with at least one non-space.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name) && !name.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Exactly five ASCII digits.
pub fn is_valid_zip_code(zip_code: &str) -> bool {
    ZIP_RE.is_match(zip_code)
}
