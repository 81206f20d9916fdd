//! Persisted settings storage.
//!
//! One TOML file per project holds the full settings tree. Writes are
//! atomic (temp file + rename in the same directory) and reads/writes are
//! guarded by an advisory lock on a sidecar file so that two processes
//! resolving the same project cannot interleave a read-merge-write cycle.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::SettingsTree;
use crate::constants::PROJECT_LOCK_FILENAME;
use crate::error::{Error, Result};

/// Reads and writes one persisted settings file.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the persisted settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the settings tree from disk.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigNotFound`] if the file does not exist,
    /// [`Error::ConfigParse`] if it cannot be read or parsed.
    pub fn load(&self) -> Result<SettingsTree> {
        if !self.path.exists() {
            return Err(Error::ConfigNotFound(self.path.clone()));
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| Error::ConfigParse {
            path: self.path.clone(),
            message: format!("read failed: {}", e),
        })?;
        toml::from_str(&contents).map_err(|e| Error::ConfigParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Performs a full rewrite of the settings file.
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// target, so a crash mid-write never leaves a corrupt file behind.
    pub fn save(&self, tree: &SettingsTree) -> Result<()> {
        let toml = toml::to_string(tree).map_err(|e| Error::ConfigWrite {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        let tmp = self.sibling_path(|name| format!("{}.tmp", name));
        fs::write(&tmp, toml).map_err(|e| self.write_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.write_err(e))
    }

    /// Takes the advisory exclusive lock guarding this settings file.
    ///
    /// Blocks until the lock is available. The lock is released when the
    /// returned guard is dropped, on every exit path.
    pub fn lock(&self) -> Result<StoreLock> {
        let lock_path = self.sibling_path(|_| PROJECT_LOCK_FILENAME.to_string());
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.lock_err(e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| self.lock_err(e))?;
        file.lock_exclusive().map_err(|e| self.lock_err(e))?;
        Ok(StoreLock { file })
    }

    /// Builds a path next to the settings file from its filename.
    fn sibling_path(&self, f: impl Fn(&str) -> String) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(f(&name))
    }

    fn write_err(&self, source: std::io::Error) -> Error {
        Error::ConfigWrite {
            path: self.path.clone(),
            source,
        }
    }

    fn lock_err(&self, source: std::io::Error) -> Error {
        Error::ConfigLock {
            path: self.path.clone(),
            source,
        }
    }
}

/// RAII guard for the store's advisory lock.
pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Dropping the file would release the lock anyway; unlock explicitly
        // so the release does not depend on close semantics.
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
