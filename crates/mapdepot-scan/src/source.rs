//! Source-control access, as a trait seam.
//!
//! The pipeline never touches repository storage directly; it asks a
//! `SourceControl` for paths, bytes, and the current watermark. The
//! local-checkout and in-memory implementations live beside it.

use crate::repo::RepoDescriptor;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The repository itself cannot be reached.
    #[error("repository '{repo_id}' unavailable: {message}")]
    Unavailable { repo_id: String, message: String },

    /// A specific file could not be read.
    #[error("unable to read '{path}' in repository '{repo_id}': {message}")]
    ReadFailed {
        repo_id: String,
        path: String,
        message: String,
    },
}

/// Read access to one logical repository of map packages.
///
/// Paths are repo-relative with `/` separators. Watermarks are opaque
/// strings ordered only by the implementation that minted them.
pub trait SourceControl: Send + Sync {
    /// Current watermark for the repository, recorded after a
    /// successful run and fed back as `since` on the next one.
    fn head(&self, repo: &RepoDescriptor) -> Result<String, SourceError>;

    /// Every file path in the repository.
    fn list_all_paths(&self, repo: &RepoDescriptor) -> Result<Vec<String>, SourceError>;

    /// File paths changed since the given watermark. `None` means no
    /// prior watermark, so everything is changed.
    fn list_changed_paths(
        &self,
        repo: &RepoDescriptor,
        since: Option<&str>,
    ) -> Result<Vec<String>, SourceError>;

    /// Exact current bytes of one file.
    fn read_file(&self, repo: &RepoDescriptor, path: &str) -> Result<Vec<u8>, SourceError>;
}
