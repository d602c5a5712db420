//! The external map-analysis capability, as a trait seam.
//!
//! The real analyzer is a separate binary that inspects a packaged map
//! and reports structural facts. The pipeline only ever talks to it
//! through [`MapAnalyzer`], so tests substitute [`crate::mock`] adapters
//! and the subprocess client stays in its own crate.

use crate::record::{BalanceCounts, MapSize, TilePos};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Structural facts about one map package, as reported by the analyzer.
///
/// This is the raw, un-normalized shape: balance categories arrive as a
/// keyed map (so missing keys are observable), authors as the package
/// declared them, HQ entries possibly absent per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAnalysis {
    pub name: String,
    pub players: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub mapsize: MapSize,
    #[serde(default)]
    pub scavenger_units: u32,
    #[serde(default)]
    pub scavenger_structures: u32,
    pub oil_wells: u32,
    /// Balance facts keyed by category wire key. Validation requires all
    /// nine fixed categories; the analyzer reports what it found.
    pub balance: BTreeMap<String, BalanceCounts>,
    /// One entry per player slot, `None` where the map has no HQ.
    pub hq: Vec<Option<TilePos>>,
}

/// Failures from running or interpreting the external analyzer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyzerError {
    /// The analyzer could not be invoked at all.
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),

    /// The analyzer ran but the package was unreadable or corrupt.
    #[error("malformed package: {0}")]
    MalformedPackage(String),

    /// The analyzer produced output this adapter cannot interpret.
    #[error("unable to parse analyzer output: {0}")]
    Parse(String),
}

/// Capability interface over the external analysis engine.
pub trait MapAnalyzer: Send + Sync {
    /// Extract structural facts from the package at `package`.
    fn analyze(&self, package: &Path) -> Result<MapAnalysis, AnalyzerError>;

    /// Render a preview image for the package, when the capability
    /// supports it. Absence of a preview is not an error.
    fn render_preview(&self, package: &Path) -> Result<Option<Vec<u8>>, AnalyzerError> {
        let _ = package;
        Ok(None)
    }
}
