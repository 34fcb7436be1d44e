//! Whole-file TOML documents with crash-safe replacement.
//!
//! A document is never edited in place: every write serializes the full value
//! to a sibling temp file, syncs it and renames it over the target. Writers
//! from different processes are serialized by an advisory lock on
//! `<name>.lock`.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use pawmatch_core::PawError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot encode TOML: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Cannot lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The file exists but does not hold a valid document.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl From<DocumentError> for PawError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::Io { source, .. } => PawError::from(source),
            DocumentError::Parse { source, .. } => PawError::from(source),
            DocumentError::Encode(source) => PawError::from(source),
            lock @ DocumentError::Lock { .. } => PawError::Storage(lock.to_string()),
        }
    }
}

/// Typed handle to one TOML file.
pub struct TomlDocument<T> {
    path: PathBuf,
    _shape: PhantomData<fn() -> T>,
}

impl<T> TomlDocument<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _shape: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document; a missing or blank file is `Ok(None)`.
    pub fn read(&self) -> Result<Option<T>, DocumentError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DocumentError::io(&self.path, e)),
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        toml::from_str(&text).map(Some).map_err(|source| DocumentError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the document with `value`.
    pub fn write(&self, value: &T) -> Result<(), DocumentError> {
        let encoded = toml::to_string_pretty(value)?;
        ensure_parent(&self.path)?;

        let staging = self.staging_path();
        let mut file = File::create(&staging).map_err(|e| DocumentError::io(&staging, e))?;
        file.write_all(encoded.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| DocumentError::io(&staging, e))?;
        drop(file);

        fs::rename(&staging, &self.path).map_err(|e| DocumentError::io(&self.path, e))
    }

    /// Locked read-modify-write.
    ///
    /// `edit` sees the stored value, or `initial` when there is none; the
    /// edited value is written back and `edit`'s return value passed through.
    pub fn modify<F, R>(&self, initial: T, edit: F) -> Result<R, DocumentError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _lock = WriterLock::acquire(&self.path)?;

        let mut value = self.read()?.unwrap_or(initial);
        let output = edit(&mut value);
        self.write(&value)?;
        Ok(output)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".staging");
        self.path.with_file_name(name)
    }
}

fn ensure_parent(path: &Path) -> Result<(), DocumentError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| DocumentError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Exclusive advisory lock, released (and its file removed) on drop.
struct WriterLock {
    file: File,
    path: PathBuf,
}

impl WriterLock {
    fn acquire(document: &Path) -> Result<Self, DocumentError> {
        let path = document.with_extension("lock");
        ensure_parent(&path)?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| DocumentError::io(&path, e))?;
        file.lock_exclusive().map_err(|source| DocumentError::Lock {
            path: path.clone(),
            source,
        })?;

        Ok(Self { file, path })
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}
