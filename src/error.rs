// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Rejections raised by the store engine for caller input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("{op}: {reason}")]
    Validation { op: &'static str, reason: String },
    #[error("add: entry for '{0}' already exists. Use 'update' instead.")]
    Duplicate(String),
    #[error("{op}: no entry found for '{site}'.")]
    NotFound { op: &'static str, site: String },
}

impl EngineError {
    pub fn validation(op: &'static str, reason: impl Into<String>) -> Self {
        EngineError::Validation { op, reason: reason.into() }
    }
}

/// Structural problems found in a decoded store document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid store schema: top-level is not an object.")]
    RootNotObject,
    #[error("Invalid store schema: missing 'metadata' or 'entries'.")]
    MissingSection,
    #[error("Invalid store schema: 'metadata' or 'entries' is not an object.")]
    SectionNotObject,
    #[error("Invalid store schema: metadata missing '{0}'.")]
    MetadataMissing(&'static str),
    #[error("Invalid store schema: metadata '{field}' must be {expected}.")]
    MetadataType { field: &'static str, expected: &'static str },
    #[error("Invalid store schema: entry for '{0}' is not an object.")]
    EntryNotObject(String),
    #[error("Invalid store schema: entry '{site}' missing '{field}'.")]
    EntryMissing { site: String, field: &'static str },
    #[error("Invalid store schema: '{site}.{field}' must be str.")]
    EntryType { site: String, field: &'static str },
    #[error("Invalid store schema: entry '{site}' has an empty '{field}'.")]
    EntryEmpty { site: String, field: &'static str },
    #[error("Invalid store schema: site key '{0}' is not normalized (expected trimmed lowercase).")]
    KeyNotNormalized(String),
    #[error("Invalid store schema: metadata.count does not match number of entries.")]
    CountMismatch { declared: i128, actual: usize },
    #[error("Invalid store schema: {0}")]
    Conversion(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store file not found at {0:?}. Run 'init' first.")]
    StoreNotFound(PathBuf),
    #[error("Store file {0:?} already exists. Use --force to overwrite it.")]
    AlreadyExists(PathBuf),
    #[error("Store file {path:?} is corrupted ({details}). Restore or re-init.")]
    Corrupt { path: PathBuf, details: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to export to {path:?}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type EngineResult<T> = Result<T, EngineError>;
pub type SchemaResult<T> = Result<T, SchemaError>;
pub type StoreResult<T> = Result<T, StoreError>;
