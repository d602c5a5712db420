//! Content-addressed asset staging.
//!
//! Layout under the assets root, per accepted map:
//!
//! ```text
//! <hash>/package.wz      exact package bytes
//! <hash>/preview.png     optional render
//! <hash>/readme.md       optional, from the package archive
//! <hash>.json            map info document, compact JSON
//! ```
//!
//! Staging is additive: a `<hash>` directory that already exists is
//! never touched again, so republishing cannot corrupt served assets.

use crate::error::FatalError;
use crate::validate::AcceptedMap;
use mapdepot_store::persist;
use std::fs;
use std::path::Path;

fn staging_err(path: &Path, error: impl std::fmt::Display) -> FatalError {
    FatalError::Staging {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// Stage every accepted map. Existing hashes are left untouched.
pub fn stage_assets(assets_root: &Path, accepted: &[AcceptedMap]) -> Result<(), FatalError> {
    fs::create_dir_all(assets_root).map_err(|e| staging_err(assets_root, e))?;
    for map in accepted {
        stage_one(assets_root, map)?;
    }
    Ok(())
}

fn stage_one(assets_root: &Path, map: &AcceptedMap) -> Result<(), FatalError> {
    let hash = map.record.content_hash().as_str();
    let final_dir = assets_root.join(hash);

    if !final_dir.exists() {
        // Build the directory aside and rename it into place so a
        // partially staged hash is never visible.
        let work_dir = assets_root.join(format!(".stage-{}-{}", hash, std::process::id()));
        fs::create_dir_all(&work_dir).map_err(|e| staging_err(&work_dir, e))?;

        let result = (|| -> Result<(), FatalError> {
            let package = work_dir.join("package.wz");
            fs::write(&package, &map.package_bytes).map_err(|e| staging_err(&package, e))?;
            if let Some(png) = &map.preview_png {
                let preview = work_dir.join("preview.png");
                fs::write(&preview, png).map_err(|e| staging_err(&preview, e))?;
            }
            if let Some(readme) = &map.readme {
                let readme_path = work_dir.join("readme.md");
                fs::write(&readme_path, readme).map_err(|e| staging_err(&readme_path, e))?;
            }
            Ok(())
        })();
        if let Err(error) = result {
            let _ = fs::remove_dir_all(&work_dir);
            return Err(error);
        }

        if let Err(error) = fs::rename(&work_dir, &final_dir) {
            let _ = fs::remove_dir_all(&work_dir);
            // A concurrent or earlier stage of the same hash won.
            if !final_dir.exists() {
                return Err(staging_err(&final_dir, error));
            }
        }
    }

    let info_path = assets_root.join(format!("{hash}.json"));
    if !info_path.exists() {
        persist::write_json_atomic(&info_path, &map.record)?;
    }
    Ok(())
}
