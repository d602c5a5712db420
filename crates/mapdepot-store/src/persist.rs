//! On-disk persistence of the published data tree.
//!
//! Every document is compact JSON, written via temp file + rename +
//! parent-directory sync so readers never observe a partial document.

use crate::page::{PageDocument, VersionIndexDocument};
use crate::urls::PublicUrls;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error at {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid document at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("unable to serialize document: {0}")]
    Serialize(String),
}

fn io_err(path: &Path, error: impl std::fmt::Display) -> PersistError {
    PersistError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// On-disk location of the 1-based page under the data root.
pub fn page_path(data_root: &Path, pagenum: usize) -> PathBuf {
    PublicUrls::page_path_components(pagenum)
        .iter()
        .fold(data_root.to_path_buf(), |p, c| p.join(c))
}

/// On-disk location of the version index under the data root.
pub fn versions_path(data_root: &Path) -> PathBuf {
    PublicUrls::versions_path_components()
        .iter()
        .fold(data_root.to_path_buf(), |p, c| p.join(c))
}

/// Load the published page set, page 1 upward, stopping at the first
/// missing page file. An absent page 1 means no prior state.
pub fn load_pages(data_root: &Path) -> Result<Vec<PageDocument>, PersistError> {
    let mut pages = Vec::new();
    for pagenum in 1.. {
        let path = page_path(data_root, pagenum);
        if !path.exists() {
            break;
        }
        pages.push(read_json_file(&path)?);
    }
    Ok(pages)
}

/// Write the full page set, then drop any stale page files left over
/// from a previously larger set.
pub fn write_pages(data_root: &Path, pages: &[PageDocument]) -> Result<(), PersistError> {
    for (index, page) in pages.iter().enumerate() {
        write_json_atomic(&page_path(data_root, index + 1), page)?;
    }
    for pagenum in pages.len() + 1.. {
        let stale = page_path(data_root, pagenum);
        if !stale.exists() {
            break;
        }
        fs::remove_file(&stale).map_err(|e| io_err(&stale, e))?;
    }
    Ok(())
}

pub fn write_version_index(
    data_root: &Path,
    index: &VersionIndexDocument,
) -> Result<(), PersistError> {
    write_json_atomic(&versions_path(data_root), index)
}

/// Read and deserialize one JSON document.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| PersistError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Serialize `value` as compact JSON and write it atomically: temp file
/// in the target directory, fsync, rename over the target, fsync the
/// directory.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let bytes = serde_json::to_vec(value).map_err(|e| PersistError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), PersistError> {
        let mut file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
        file.write_all(&bytes).map_err(|e| io_err(&tmp_path, e))?;
        file.sync_all().map_err(|e| io_err(&tmp_path, e))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_err(path, e)
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent).map_err(|e| io_err(parent, e))?;
        dir.sync_all().map_err(|e| io_err(parent, e))?;
    }

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}
