//! Per-candidate validation: bytes in, an outcome and (when accepted)
//! a stageable payload out.
//!
//! Runs on worker threads; everything here is a function of the
//! candidate plus read-only store state.

use crate::outcome::{MapOutcome, OutcomeKind};
use mapdepot_kernel::identity;
use mapdepot_kernel::{
    MapAnalyzer, MapRecord, ValidationContext, ValidationFailure, build_record,
};
use mapdepot_scan::{Candidate, SourceControl};
use mapdepot_store::DatabaseStore;
use std::io::{Cursor, Read};
use std::path::PathBuf;

/// Everything the later pipeline stages need for one accepted map.
#[derive(Debug, Clone)]
pub struct AcceptedMap {
    pub record: MapRecord,
    pub warnings: Vec<String>,
    pub package_bytes: Vec<u8>,
    pub preview_png: Option<Vec<u8>>,
    pub readme: Option<Vec<u8>>,
}

/// Validate one candidate. Never fails the run; every failure becomes
/// a `Rejected` outcome for this candidate alone.
pub(crate) fn validate_candidate(
    source: &dyn SourceControl,
    analyzer: &dyn MapAnalyzer,
    store: &DatabaseStore,
    candidate: &Candidate,
    uploaded_at: &str,
) -> (MapOutcome, Option<AcceptedMap>) {
    match process(source, analyzer, store, candidate, uploaded_at) {
        Ok(Some(accepted)) => {
            let outcome = MapOutcome {
                repo_id: candidate.repo.id.clone(),
                path: candidate.path.clone(),
                kind: OutcomeKind::Accepted {
                    content_hash: accepted.record.content_hash().as_str().to_string(),
                    warnings: accepted.warnings.clone(),
                },
            };
            (outcome, Some(accepted))
        }
        Ok(None) => (
            MapOutcome {
                repo_id: candidate.repo.id.clone(),
                path: candidate.path.clone(),
                kind: OutcomeKind::Skipped {
                    reason: "unchanged content".to_string(),
                },
            },
            None,
        ),
        Err(failure) => (
            MapOutcome {
                repo_id: candidate.repo.id.clone(),
                path: candidate.path.clone(),
                kind: OutcomeKind::Rejected {
                    category: failure.category().to_string(),
                    detail: failure.to_string(),
                },
            },
            None,
        ),
    }
}

/// `Ok(None)` means the store already holds this exact content.
fn process(
    source: &dyn SourceControl,
    analyzer: &dyn MapAnalyzer,
    store: &DatabaseStore,
    candidate: &Candidate,
    uploaded_at: &str,
) -> Result<Option<AcceptedMap>, ValidationFailure> {
    let bytes = source
        .read_file(&candidate.repo, &candidate.path)
        .map_err(|e| ValidationFailure::MalformedPackage(format!("unable to read package: {e}")))?;

    let hash = identity::identify(&bytes);
    if store.contains(&hash) {
        return Ok(None);
    }

    // The analyzer wants a real file carrying the candidate's own file
    // name; analysis may key off it.
    let (_scratch_dir, scratch_path) = scratch_package(&candidate.path, &bytes)
        .map_err(|e| ValidationFailure::AnalyzerUnavailable(format!("scratch file: {e}")))?;

    let analysis = analyzer.analyze(&scratch_path)?;
    let ctx = ValidationContext {
        repo_id: candidate.repo.id.clone(),
        path: candidate.path.clone(),
        expected_players: candidate.repo.expected_players,
        uploaded_at: uploaded_at.to_string(),
    };
    let validated = build_record(&analysis, &ctx, hash, bytes.len() as u64)?;

    // Preview rendering is best-effort; a failed render never rejects
    // the map.
    let preview_png = analyzer.render_preview(&scratch_path).unwrap_or(None);
    let readme = extract_readme(&bytes);

    Ok(Some(AcceptedMap {
        record: validated.record,
        warnings: validated.warnings,
        package_bytes: bytes,
        preview_png,
        readme,
    }))
}

/// Write the package bytes into a scratch directory under the
/// candidate's original file name. The directory guard must stay alive
/// for as long as the returned path is used.
fn scratch_package(path: &str, bytes: &[u8]) -> std::io::Result<(tempfile::TempDir, PathBuf)> {
    let file_name = path
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("package.wz");
    let dir = tempfile::tempdir()?;
    let package_path = dir.path().join(file_name);
    std::fs::write(&package_path, bytes)?;
    Ok((dir, package_path))
}

/// Top-level `README.md` from the package archive, when present.
fn extract_readme(package_bytes: &[u8]) -> Option<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package_bytes)).ok()?;
    let mut file = archive.by_name("README.md").ok()?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).ok()?;
    Some(contents)
}
