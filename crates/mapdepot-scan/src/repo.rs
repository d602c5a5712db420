//! Repository descriptors and the repos-config document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One map repository: where its packages live and what player count
/// every map in it must declare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoDescriptor {
    /// Stable identifier, e.g. `"2p"`. Unique across the config.
    pub id: String,
    /// Required player slot count for every map in this repository.
    pub expected_players: u8,
    /// Path prefix under which packages are considered, repo-relative.
    #[serde(default = "default_maps_root")]
    pub maps_root: String,
    /// File suffix a package path must carry.
    #[serde(default = "default_package_suffix")]
    pub package_suffix: String,
}

fn default_maps_root() -> String {
    "maps".to_string()
}

fn default_package_suffix() -> String {
    ".wz".to_string()
}

impl RepoDescriptor {
    /// True when `path` names a package this repository publishes.
    pub fn is_package_path(&self, path: &str) -> bool {
        path.strip_prefix(&self.maps_root)
            .is_some_and(|rest| rest.starts_with('/'))
            && path.ends_with(&self.package_suffix)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepoConfigError {
    #[error("repos config is not a JSON array of repository descriptors: {0}")]
    Malformed(String),
    #[error("duplicate repository id '{0}'")]
    DuplicateId(String),
    #[error("repository '{id}': expected player count {players} is outside 2..=10")]
    PlayerCountOutOfRange { id: String, players: u8 },
}

/// Parse and check the repos-config document.
pub fn load_repos_config(config: &serde_json::Value) -> Result<Vec<RepoDescriptor>, RepoConfigError> {
    let repos: Vec<RepoDescriptor> = serde_json::from_value(config.clone())
        .map_err(|e| RepoConfigError::Malformed(e.to_string()))?;

    let mut seen = BTreeSet::new();
    for repo in &repos {
        if !seen.insert(repo.id.clone()) {
            return Err(RepoConfigError::DuplicateId(repo.id.clone()));
        }
        if !(2..=10).contains(&repo.expected_players) {
            return Err(RepoConfigError::PlayerCountOutOfRange {
                id: repo.id.clone(),
                players: repo.expected_players,
            });
        }
    }
    Ok(repos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_to_omitted_fields() {
        let repos = load_repos_config(&json!([
            {"id": "2p", "expectedPlayers": 2},
            {"id": "8p", "expectedPlayers": 8, "mapsRoot": "packages", "packageSuffix": ".zip"}
        ]))
        .unwrap();
        assert_eq!(repos[0].maps_root, "maps");
        assert_eq!(repos[0].package_suffix, ".wz");
        assert_eq!(repos[1].maps_root, "packages");
        assert_eq!(repos[1].package_suffix, ".zip");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = load_repos_config(&json!([
            {"id": "2p", "expectedPlayers": 2},
            {"id": "2p", "expectedPlayers": 4}
        ]))
        .unwrap_err();
        assert!(matches!(err, RepoConfigError::DuplicateId(id) if id == "2p"));
    }

    #[test]
    fn player_count_outside_range_is_rejected() {
        let err = load_repos_config(&json!([{"id": "big", "expectedPlayers": 11}])).unwrap_err();
        assert!(matches!(
            err,
            RepoConfigError::PlayerCountOutOfRange { players: 11, .. }
        ));
    }

    #[test]
    fn package_path_filter_requires_root_and_suffix() {
        let repo = RepoDescriptor {
            id: "2p".to_string(),
            expected_players: 2,
            maps_root: "maps".to_string(),
            package_suffix: ".wz".to_string(),
        };
        assert!(repo.is_package_path("maps/alpha.wz"));
        assert!(repo.is_package_path("maps/deep/alpha.wz"));
        assert!(!repo.is_package_path("maps/alpha.txt"));
        assert!(!repo.is_package_path("other/alpha.wz"));
        assert!(!repo.is_package_path("mapsx/alpha.wz"));
        assert!(!repo.is_package_path("maps.wz"));
    }
}
