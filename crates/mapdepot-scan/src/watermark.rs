//! Per-repository watermark persistence.
//!
//! Watermarks live beside the published data at
//! `<data_root>/.config/watermarks.json` and advance only after a
//! successful run, so a failed run reprocesses the same changes.

use mapdepot_store::persist::{self, PersistError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum WatermarkError {
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// repo id -> opaque watermark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatermarkSet {
    marks: BTreeMap<String, String>,
}

impl WatermarkSet {
    pub fn get(&self, repo_id: &str) -> Option<&str> {
        self.marks.get(repo_id).map(String::as_str)
    }

    pub fn set(&mut self, repo_id: &str, mark: String) {
        self.marks.insert(repo_id.to_string(), mark);
    }

    fn path(data_root: &Path) -> PathBuf {
        data_root.join(".config").join("watermarks.json")
    }

    /// Load from the data root. A missing file is an empty set, so the
    /// first run processes everything.
    pub fn load(data_root: &Path) -> Result<Self, WatermarkError> {
        let path = Self::path(data_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(persist::read_json_file(&path)?)
    }

    pub fn save(&self, data_root: &Path) -> Result<(), WatermarkError> {
        Ok(persist::write_json_atomic(&Self::path(data_root), self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let marks = WatermarkSet::load(dir.path()).unwrap();
        assert_eq!(marks, WatermarkSet::default());
        assert_eq!(marks.get("2p"), None);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut marks = WatermarkSet::default();
        marks.set("2p", "17".to_string());
        marks.set("4p", "2025-06-01".to_string());
        marks.save(dir.path()).unwrap();

        let loaded = WatermarkSet::load(dir.path()).unwrap();
        assert_eq!(loaded, marks);
        assert_eq!(loaded.get("2p"), Some("17"));
    }
}
