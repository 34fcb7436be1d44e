//! Path management for PawMatch files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/pawmatch/          # Config directory
//! ├── config.toml              # Client configuration
//! └── state.toml               # Persisted session/search state
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "pawmatch";

/// Resolves every file location from one root directory.
#[derive(Debug, Clone)]
pub struct PawPaths {
    root: PathBuf,
}

impl PawPaths {
    /// Uses the platform config directory (XDG on Linux).
    pub fn from_platform() -> Result<Self, PathError> {
        let base = dirs::config_dir().ok_or(PathError::ConfigDirNotFound)?;
        Ok(Self::with_root(base.join(APP_DIR)))
    }

    /// Uses an explicit root, e.g. a temp dir in tests.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join("state.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = PawPaths::with_root("/tmp/pawmatch-test");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/pawmatch-test/config.toml"));
        assert_eq!(paths.state_file(), PathBuf::from("/tmp/pawmatch-test/state.toml"));
    }

    #[test]
    fn test_platform_root_ends_with_app_dir() {
        if let Ok(paths) = PawPaths::from_platform() {
            assert!(paths.root().ends_with(APP_DIR));
        }
    }
}
