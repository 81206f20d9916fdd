//! Error taxonomy for folio.
//!
//! Configuration errors at startup are fatal; per-component render failures
//! are contained at the registry boundary and reported as part of the batch
//! result instead of aborting it.

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::Category;

/// All recoverable error conditions folio distinguishes.
#[derive(Debug, Error)]
pub enum Error {
    /// The persisted settings file (or project) does not exist.
    #[error("settings file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// A settings file or default template failed to parse.
    #[error("failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Writing the persisted settings file failed.
    #[error("failed to write {path}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Acquiring the advisory lock on the settings file failed.
    #[error("failed to lock {path}")]
    ConfigLock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A type name was registered twice within the same category.
    #[error("type '{name}' is already registered in category '{category}'")]
    DuplicateType { category: Category, name: String },

    /// A type name was requested that no factory provides.
    #[error("unknown {category} type '{name}'")]
    UnknownType { category: Category, name: String },

    /// A scope element required by the requested operation is missing.
    #[error("missing required argument: {0}")]
    MissingRequiredArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
