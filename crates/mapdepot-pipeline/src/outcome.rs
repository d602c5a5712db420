//! Run summaries: per-map outcomes and the overall build report.

use serde::Serialize;

/// What happened to one candidate package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOutcome {
    pub repo_id: String,
    pub path: String,
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum OutcomeKind {
    #[serde(rename_all = "camelCase")]
    Accepted {
        content_hash: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Rejected {
        /// Stable failure category label, e.g. `slot-mismatch`.
        category: String,
        detail: String,
    },
    Skipped {
        reason: String,
    },
}

/// Tallies over a run's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounts {
    pub scanned: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub superseded: usize,
}

/// The full report of one pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRun {
    /// Ephemeral run identifier (UUID v4), for log correlation only.
    pub run_id: String,
    /// `incremental` or `full`.
    pub mode: String,
    pub started_at: String,
    pub repos: Vec<String>,
    pub outcomes: Vec<MapOutcome>,
    pub counts: RunCounts,
    /// True when the published database differs from the previous run.
    pub changed: bool,
}

impl BuildRun {
    /// Recompute `counts` from `outcomes`, keeping `superseded`.
    pub fn tally(outcomes: &[MapOutcome], superseded: usize) -> RunCounts {
        let mut counts = RunCounts {
            scanned: outcomes.len(),
            superseded,
            ..RunCounts::default()
        };
        for outcome in outcomes {
            match outcome.kind {
                OutcomeKind::Accepted { .. } => counts.accepted += 1,
                OutcomeKind::Rejected { .. } => counts.rejected += 1,
                OutcomeKind::Skipped { .. } => counts.skipped += 1,
            }
        }
        counts
    }
}
