//! On-disk session store
//!
//! The session directory is the only durable state of a run. It holds the
//! cursor files (`next`, `last`), the numbered mails produced by the
//! splitter, and the per-patch scratch files (`info`, `msg`, `patch`,
//! `author-script`, `final-commit`). Everything here is plain files; there
//! is no locking, and concurrent sessions on the same repository are
//! outside the contract.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Owns the session directory and the scalar files inside it.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at `dir`. The directory is not created here;
    /// see [`SessionStore::create_dir`].
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Absolute path of the session directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Joins `rel` onto the session directory.
    #[must_use]
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.join(rel)
    }

    /// Returns true iff a session is in progress: the directory exists and
    /// both `next` and `last` are regular files.
    ///
    /// # Errors
    ///
    /// Missing entries yield `Ok(false)`; any other stat failure is fatal.
    pub fn in_progress(&self) -> Result<bool> {
        if !is_dir(&self.dir)? {
            return Ok(false);
        }
        Ok(is_file(&self.path("next"))? && is_file(&self.path("last"))?)
    }

    /// Creates the session directory. An already existing directory is not
    /// an error; a resumable run may have left it behind.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` for any failure other than `AlreadyExists`.
    pub fn create_dir(&self) -> Result<()> {
        match fs::create_dir(&self.dir) {
            Ok(()) => {
                tracing::debug!("created session directory {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(Error::io("create directory", &self.dir, e)),
        }
    }

    /// Reads the contents of `rel`. Returns `None` if the file does not
    /// exist. Trailing whitespace is stripped iff `trim` is set.
    ///
    /// # Errors
    ///
    /// Any read failure other than `NotFound` is fatal.
    pub fn read_scalar(&self, rel: &str, trim: bool) -> Result<Option<String>> {
        let path = self.path(rel);
        match fs::read_to_string(&path) {
            Ok(mut contents) => {
                if trim {
                    contents.truncate(contents.trim_end().len());
                }
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io("read", &path, e)),
        }
    }

    /// Writes `contents` to `rel`, truncating any previous file and
    /// guaranteeing a trailing newline. Resume correctness leans on the
    /// durability of `next` in particular.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be written.
    pub fn write_scalar(&self, rel: &str, contents: &str) -> Result<()> {
        let path = self.path(rel);
        let mut data = contents.to_string();
        if !data.ends_with('\n') {
            data.push('\n');
        }
        fs::write(&path, data).map_err(|e| Error::io("write", &path, e))
    }

    /// Removes `rel` if present; a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` for any failure other than `NotFound`.
    pub fn remove(&self, rel: &str) -> Result<()> {
        let path = self.path(rel);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io("remove", &path, e)),
        }
    }

    /// Recursively removes the session directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if removal fails for a reason other than the
    /// directory already being gone.
    pub fn destroy(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                tracing::debug!("removed session directory {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io("remove directory", &self.dir, e)),
        }
    }
}

fn is_dir(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io("stat", path, e)),
    }
}

fn is_file(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io("stat", path, e)),
    }
}
