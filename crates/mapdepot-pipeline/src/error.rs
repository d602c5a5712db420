//! Fatal errors: the failures that abort a run instead of becoming a
//! per-map outcome.

use mapdepot_scan::{RepoConfigError, SourceError, WatermarkError};
use mapdepot_store::{PersistError, StoreError, UrlConfigError};

#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// A configuration document could not be read or understood.
    #[error("configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Repos(#[from] RepoConfigError),

    #[error(transparent)]
    Urls(#[from] UrlConfigError),

    /// Repository-level source failure. File-level read failures are
    /// per-map outcomes, not fatal.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Divergent content under one hash. Unrecoverable.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    #[error("asset staging at {path}: {message}")]
    Staging { path: String, message: String },
}
