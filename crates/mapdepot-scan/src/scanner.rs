//! Candidate scanning: turn repositories plus watermarks into the
//! ordered set of package paths to (re)validate.

use crate::repo::RepoDescriptor;
use crate::source::{SourceControl, SourceError};
use crate::watermark::WatermarkSet;
use std::collections::BTreeSet;

/// Which paths a run considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Paths changed since each repository's watermark.
    Incremental,
    /// Every package path, watermarks ignored.
    Full,
}

/// One package path queued for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub repo: RepoDescriptor,
    pub path: String,
}

/// Produce the candidate set: per repository, list paths for the mode,
/// keep package paths only, deduplicate, and order the whole set
/// lexicographically by (repo id, path).
pub fn scan_candidates(
    source: &dyn SourceControl,
    repos: &[RepoDescriptor],
    watermarks: &WatermarkSet,
    mode: ScanMode,
) -> Result<Vec<Candidate>, SourceError> {
    let mut ordered: Vec<&RepoDescriptor> = repos.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut candidates = Vec::new();
    for repo in ordered {
        let paths = match mode {
            ScanMode::Full => source.list_all_paths(repo)?,
            ScanMode::Incremental => {
                source.list_changed_paths(repo, watermarks.get(&repo.id))?
            }
        };
        let unique: BTreeSet<String> = paths
            .into_iter()
            .filter(|path| repo.is_package_path(path))
            .collect();
        candidates.extend(unique.into_iter().map(|path| Candidate {
            repo: repo.clone(),
            path,
        }));
    }
    Ok(candidates)
}
