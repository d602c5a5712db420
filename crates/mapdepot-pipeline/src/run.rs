//! Run orchestration: one `run` call takes the pipeline from scan to
//! report, writing published state only at the end.

use crate::error::FatalError;
use crate::outcome::{BuildRun, MapOutcome, OutcomeKind};
use crate::stage::stage_assets;
use crate::validate::{AcceptedMap, validate_candidate};
use chrono::Utc;
use mapdepot_kernel::{MapAnalyzer, MapRecord};
use mapdepot_scan::{RepoDescriptor, ScanMode, SourceControl, WatermarkSet, scan_candidates};
use mapdepot_store::{
    DatabaseStore, PaginationMode, PublicUrls, UpsertOutcome, build_version_index, load_pages,
    repaginate, version_token, write_pages, write_version_index,
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How much of the corpus a run reconsiders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Changed-since-watermark candidates against prior published state.
    Incremental,
    /// Everything from scratch: prior pages ignored, fresh tokens.
    Full,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Incremental => "incremental",
            RunMode::Full => "full",
        }
    }

    fn scan_mode(&self) -> ScanMode {
        match self {
            RunMode::Incremental => ScanMode::Incremental,
            RunMode::Full => ScanMode::Full,
        }
    }

    fn pagination_mode(&self) -> PaginationMode {
        match self {
            RunMode::Incremental => PaginationMode::PreserveUnchanged,
            RunMode::Full => PaginationMode::FreshTokens,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub repos: Vec<RepoDescriptor>,
    pub urls: PublicUrls,
    /// Root of the published JSON tree (pages, version index, watermarks).
    pub data_root: PathBuf,
    /// Root of the content-addressed asset tree.
    pub assets_root: PathBuf,
    pub page_capacity: usize,
    /// Validation worker threads. `None` lets rayon size the pool.
    pub workers: Option<usize>,
}

/// Execute one pipeline run.
///
/// Fatal failures abort before anything under `data_root` changes;
/// per-map failures land in the returned outcomes. In incremental mode
/// a run that changed nothing writes nothing, watermarks included.
pub fn run(
    config: &PipelineConfig,
    source: &dyn SourceControl,
    analyzer: &dyn MapAnalyzer,
    mode: RunMode,
) -> Result<BuildRun, FatalError> {
    let now = Utc::now();
    let run_id = uuid::Uuid::new_v4().to_string();

    let mut watermarks = WatermarkSet::load(&config.data_root)?;
    let previous_pages = match mode {
        RunMode::Incremental => load_pages(&config.data_root)?,
        RunMode::Full => Vec::new(),
    };
    let prior_records: Vec<MapRecord> = previous_pages
        .iter()
        .flat_map(|page| page.maps.iter().cloned())
        .collect();
    let mut store = DatabaseStore::from_records(prior_records)?;

    // Snapshot each repository's head before scanning: a file changed
    // after this point may be missed by the scan, so the recorded
    // watermark must not cover it.
    let mut heads = BTreeMap::new();
    for repo in &config.repos {
        heads.insert(repo.id.clone(), source.head(repo)?);
    }

    let candidates = scan_candidates(source, &config.repos, &watermarks, mode.scan_mode())?;

    // Validation fans out; everything after it is sequential so the
    // merge order stays the candidate order.
    let uploaded_at = now.format("%Y-%m-%d").to_string();
    let validate_all = || -> Vec<(MapOutcome, Option<AcceptedMap>)> {
        candidates
            .par_iter()
            .map(|candidate| validate_candidate(source, analyzer, &store, candidate, &uploaded_at))
            .collect()
    };
    let results = match config.workers {
        Some(workers) => rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| FatalError::Config(format!("worker pool: {e}")))?
            .install(validate_all),
        None => validate_all(),
    };

    let mut outcomes = Vec::with_capacity(results.len());
    let mut staged = Vec::new();
    let mut inserted = 0usize;
    let mut superseded = 0usize;
    for (mut outcome, payload) in results {
        if let Some(payload) = payload {
            match store.upsert(payload.record.clone())? {
                UpsertOutcome::Inserted => {
                    inserted += 1;
                    staged.push(payload);
                }
                UpsertOutcome::Superseded { .. } => {
                    superseded += 1;
                    staged.push(payload);
                }
                // Two candidates in one run carried identical bytes.
                UpsertOutcome::Unchanged => {
                    outcome.kind = OutcomeKind::Skipped {
                        reason: "unchanged content".to_string(),
                    };
                }
            }
        }
        outcomes.push(outcome);
    }

    let changed = inserted + superseded > 0 || mode == RunMode::Full;
    if changed {
        let token = version_token(now);
        let pages = repaginate(
            &store,
            &previous_pages,
            &config.urls,
            config.page_capacity,
            &token,
            mode.pagination_mode(),
        );
        let index = build_version_index(&pages);

        stage_assets(&config.assets_root, &staged)?;
        write_pages(&config.data_root, &pages)?;
        write_version_index(&config.data_root, &index)?;

        for repo in &config.repos {
            if let Some(head) = heads.remove(&repo.id) {
                watermarks.set(&repo.id, head);
            }
        }
        watermarks.save(&config.data_root)?;
    }

    let counts = BuildRun::tally(&outcomes, superseded);
    Ok(BuildRun {
        run_id,
        mode: mode.as_str().to_string(),
        started_at: now.to_rfc3339(),
        repos: config.repos.iter().map(|r| r.id.clone()).collect(),
        outcomes,
        counts,
        changed,
    })
}
