//! In-memory source for tests: revision-counter watermarks, mutable
//! between runs.

use crate::repo::RepoDescriptor;
use crate::source::{SourceControl, SourceError};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct RepoFiles {
    /// path -> (bytes, revision the file last changed at)
    files: BTreeMap<String, (Vec<u8>, u64)>,
    revision: u64,
}

/// Programmable repository set. Each `add_file` bumps the repository's
/// revision counter; the counter is the watermark.
#[derive(Debug, Default)]
pub struct MemorySource {
    repos: Mutex<BTreeMap<String, RepoFiles>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file, advancing the repository's revision.
    pub fn add_file(&self, repo_id: &str, path: &str, bytes: impl Into<Vec<u8>>) {
        let mut repos = self.repos.lock().unwrap();
        let repo = repos.entry(repo_id.to_string()).or_default();
        repo.revision += 1;
        let revision = repo.revision;
        repo.files.insert(path.to_string(), (bytes.into(), revision));
    }

    fn with_repo<T>(
        &self,
        repo: &RepoDescriptor,
        f: impl FnOnce(&RepoFiles) -> T,
    ) -> Result<T, SourceError> {
        let repos = self.repos.lock().unwrap();
        repos
            .get(&repo.id)
            .map(f)
            .ok_or_else(|| SourceError::Unavailable {
                repo_id: repo.id.clone(),
                message: "unknown repository".to_string(),
            })
    }
}

impl SourceControl for MemorySource {
    fn head(&self, repo: &RepoDescriptor) -> Result<String, SourceError> {
        self.with_repo(repo, |r| r.revision.to_string())
    }

    fn list_all_paths(&self, repo: &RepoDescriptor) -> Result<Vec<String>, SourceError> {
        self.with_repo(repo, |r| r.files.keys().cloned().collect())
    }

    fn list_changed_paths(
        &self,
        repo: &RepoDescriptor,
        since: Option<&str>,
    ) -> Result<Vec<String>, SourceError> {
        let floor: u64 = match since {
            Some(mark) => mark.parse().unwrap_or(0),
            None => 0,
        };
        self.with_repo(repo, |r| {
            r.files
                .iter()
                .filter(|(_, (_, revision))| *revision > floor)
                .map(|(path, _)| path.clone())
                .collect()
        })
    }

    fn read_file(&self, repo: &RepoDescriptor, path: &str) -> Result<Vec<u8>, SourceError> {
        self.with_repo(repo, |r| r.files.get(path).map(|(bytes, _)| bytes.clone()))?
            .ok_or_else(|| SourceError::ReadFailed {
                repo_id: repo.id.clone(),
                path: path.to_string(),
                message: "no such file".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: &str) -> RepoDescriptor {
        RepoDescriptor {
            id: id.to_string(),
            expected_players: 2,
            maps_root: "maps".to_string(),
            package_suffix: ".wz".to_string(),
        }
    }

    #[test]
    fn revisions_advance_and_gate_changed_paths() {
        let source = MemorySource::new();
        source.add_file("2p", "maps/alpha.wz", b"a".to_vec());
        let mark = source.head(&repo("2p")).unwrap();
        assert_eq!(mark, "1");

        source.add_file("2p", "maps/beta.wz", b"b".to_vec());
        assert_eq!(
            source
                .list_changed_paths(&repo("2p"), Some(&mark))
                .unwrap(),
            vec!["maps/beta.wz".to_string()]
        );
        assert_eq!(source.list_all_paths(&repo("2p")).unwrap().len(), 2);
    }

    #[test]
    fn replacing_a_file_marks_it_changed_again() {
        let source = MemorySource::new();
        source.add_file("2p", "maps/alpha.wz", b"v1".to_vec());
        let mark = source.head(&repo("2p")).unwrap();

        source.add_file("2p", "maps/alpha.wz", b"v2".to_vec());
        assert_eq!(
            source
                .list_changed_paths(&repo("2p"), Some(&mark))
                .unwrap(),
            vec!["maps/alpha.wz".to_string()]
        );
        assert_eq!(
            source.read_file(&repo("2p"), "maps/alpha.wz").unwrap(),
            b"v2"
        );
    }
}
