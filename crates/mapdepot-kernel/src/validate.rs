//! Schema validation and normalization: analyzer facts in, records out.
//!
//! Everything here is a pure function of the analysis plus the owning
//! repository's context. Failures are per-map and never abort a batch;
//! warnings are advisory and surface in run summaries only.

use crate::analyzer::{AnalyzerError, MapAnalysis};
use crate::identity::ContentHash;
use crate::record::{Authors, DownloadInfo, HqEntry, MapRecord, PlayerBalance};
use regex::Regex;
use std::sync::LazyLock;

/// Map names stick to a legacy-safe character set.
static NAME_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-_]+$").expect("static regex"));

/// One token of a license expression.
static LICENSE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[()A-Za-z0-9.+\-]+$").expect("static regex"));

const MIN_SUGGESTED_NAME_LEN: usize = 6;
const MAX_SUGGESTED_NAME_LEN: usize = 30;
const MAX_NAME_LEN: usize = 60;
const MAX_AUTHOR_NAME_LEN: usize = 60;
const MAX_MAP_DIMENSION: u32 = 256;

/// Why one map candidate was rejected. Isolated to that candidate; the
/// surrounding run continues.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationFailure {
    #[error("malformed package: {0}")]
    MalformedPackage(String),

    #[error("slot mismatch: map declares {actual} players, repository expects {expected}")]
    SlotMismatch { expected: u8, actual: u8 },

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("analyzer unavailable: {0}")]
    AnalyzerUnavailable(String),
}

impl ValidationFailure {
    /// Stable category label used in run-outcome reasons.
    pub fn category(&self) -> &'static str {
        match self {
            ValidationFailure::MalformedPackage(_) => "malformed-package",
            ValidationFailure::SlotMismatch { .. } => "slot-mismatch",
            ValidationFailure::SchemaViolation(_) => "schema-violation",
            ValidationFailure::AnalyzerUnavailable(_) => "analyzer-unavailable",
        }
    }
}

impl From<AnalyzerError> for ValidationFailure {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::MalformedPackage(msg) => ValidationFailure::MalformedPackage(msg),
            AnalyzerError::Unavailable(msg) | AnalyzerError::Parse(msg) => {
                ValidationFailure::AnalyzerUnavailable(msg)
            }
        }
    }
}

/// Repository-side facts the analyzer cannot know.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub repo_id: String,
    pub path: String,
    /// Player count the owning repository declares for all of its maps.
    pub expected_players: u8,
    pub uploaded_at: String,
}

/// A record admitted into the database, with advisory warnings.
#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    pub record: MapRecord,
    pub warnings: Vec<String>,
}

/// Normalize analyzer facts into a canonical [`MapRecord`].
///
/// Enforces: player count matches the repository, all nine balance
/// categories present, HQ list length equals slots, positive map
/// dimensions, usable name/author/license. Anything softer becomes a
/// warning.
pub fn build_record(
    analysis: &MapAnalysis,
    ctx: &ValidationContext,
    content_hash: ContentHash,
    byte_size: u64,
) -> Result<ValidatedRecord, ValidationFailure> {
    let mut warnings = Vec::new();

    check_name(&analysis.name, &mut warnings)?;

    if !(2..=10).contains(&analysis.players) {
        return Err(ValidationFailure::SchemaViolation(format!(
            "'players' must be 2..=10, got {}",
            analysis.players
        )));
    }
    if analysis.players != ctx.expected_players {
        return Err(ValidationFailure::SlotMismatch {
            expected: ctx.expected_players,
            actual: analysis.players,
        });
    }

    let author = check_author(analysis)?;
    let license = check_license(analysis.license.as_deref())?;

    for (label, dim) in [("w", analysis.mapsize.w), ("h", analysis.mapsize.h)] {
        if dim == 0 || dim > MAX_MAP_DIMENSION {
            return Err(ValidationFailure::SchemaViolation(format!(
                "'size.{label}' must be 1..={MAX_MAP_DIMENSION}, got {dim}"
            )));
        }
    }

    let balance = PlayerBalance::from_map(&analysis.balance).map_err(|missing| {
        ValidationFailure::SchemaViolation(format!("balance is missing category '{missing}'"))
    })?;
    for (category, counts) in balance.by_category() {
        if counts.min > counts.max {
            return Err(ValidationFailure::SchemaViolation(format!(
                "balance category '{}' has min {} > max {}",
                category.key(),
                counts.min,
                counts.max
            )));
        }
    }

    if analysis.hq.len() != analysis.players as usize {
        return Err(ValidationFailure::SchemaViolation(format!(
            "'hq' has {} entries for {} player slots",
            analysis.hq.len(),
            analysis.players
        )));
    }
    let hq_locations: Vec<HqEntry> = analysis.hq.iter().map(|pos| HqEntry(*pos)).collect();
    for (slot, entry) in hq_locations.iter().enumerate() {
        if entry.0.is_none() {
            warnings.push(format!("player {slot} has no HQ / command center"));
        }
    }

    if analysis.oil_wells == 0 && balance.resource_extractors.min == 0 {
        warnings.push(
            "'oilWells' is 0 and at least one player has no starting resource extractors"
                .to_string(),
        );
    }
    if balance.power_generators.min == 0 {
        warnings.push("at least one player has no starting power generators".to_string());
    }
    if balance.regular_factories.min == 0
        && balance.vtol_factories.min == 0
        && balance.cyborg_factories.min == 0
    {
        warnings.push("at least one player has no starting factories".to_string());
    }
    if balance.research_centers.min == 0 {
        warnings.push("at least one player has no starting research centers".to_string());
    }

    let record = MapRecord {
        name: analysis.name.clone(),
        slots: analysis.players,
        author,
        license,
        size: analysis.mapsize,
        scavenger_count: analysis.scavenger_units + analysis.scavenger_structures,
        oil_wells: analysis.oil_wells,
        balance,
        hq_locations,
        download: DownloadInfo {
            repo_id: ctx.repo_id.clone(),
            path: ctx.path.clone(),
            uploaded_at: ctx.uploaded_at.clone(),
            content_hash,
            byte_size,
        },
    };

    Ok(ValidatedRecord { record, warnings })
}

fn check_name(name: &str, warnings: &mut Vec<String>) -> Result<(), ValidationFailure> {
    if name.is_empty() {
        return Err(ValidationFailure::SchemaViolation(
            "'name' must be non-empty".to_string(),
        ));
    }
    if !NAME_FORMAT.is_match(name) {
        return Err(ValidationFailure::SchemaViolation(format!(
            "'name' has unsupported characters (allowed: A-Z, a-z, 0-9, '-', '_'): '{name}'"
        )));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationFailure::SchemaViolation(format!(
            "'name' is longer than {MAX_NAME_LEN} chars: '{name}'"
        )));
    }
    if name.len() < MIN_SUGGESTED_NAME_LEN {
        warnings.push(format!(
            "'name' is shorter than {MIN_SUGGESTED_NAME_LEN} chars; consider a longer name: '{name}'"
        ));
    } else if name.len() > MAX_SUGGESTED_NAME_LEN {
        warnings.push(format!(
            "'name' is longer than {MAX_SUGGESTED_NAME_LEN} chars; long names may be truncated: '{name}'"
        ));
    }
    Ok(())
}

fn check_author(analysis: &MapAnalysis) -> Result<Authors, ValidationFailure> {
    let names = analysis
        .author
        .iter()
        .chain(analysis.additional_authors.iter())
        .cloned();
    let authors = Authors::from_names(names)
        .ok_or_else(|| ValidationFailure::SchemaViolation("missing 'author'".to_string()))?;
    for name in authors.names() {
        if name.len() > MAX_AUTHOR_NAME_LEN {
            return Err(ValidationFailure::SchemaViolation(format!(
                "author name is longer than {MAX_AUTHOR_NAME_LEN} chars"
            )));
        }
    }
    Ok(authors)
}

fn check_license(license: Option<&str>) -> Result<String, ValidationFailure> {
    let license = license.unwrap_or_default();
    if license.is_empty() {
        return Err(ValidationFailure::SchemaViolation(
            "missing 'license'".to_string(),
        ));
    }
    // Token well-formedness only; never semantic SPDX equivalence.
    for token in license.split_whitespace() {
        if !LICENSE_TOKEN.is_match(token) {
            return Err(ValidationFailure::SchemaViolation(format!(
                "'license' has a malformed token: '{token}'"
            )));
        }
    }
    Ok(license.to_string())
}
