//! Programmable analyzer fixtures for tests.
//!
//! The pipeline treats the analysis engine as a black box behind
//! [`MapAnalyzer`]; tests swap in a [`MockAnalyzer`] keyed by package
//! file name.

use crate::analyzer::{AnalyzerError, MapAnalysis, MapAnalyzer};
use crate::record::{BalanceCategory, BalanceCounts, MapSize, TilePos};
use std::collections::BTreeMap;
use std::path::Path;

/// In-memory analyzer: responses keyed by package file name.
#[derive(Debug, Default)]
pub struct MockAnalyzer {
    analyses: BTreeMap<String, MapAnalysis>,
    failures: BTreeMap<String, AnalyzerError>,
    previews: BTreeMap<String, Vec<u8>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `analyze` for `file_name` with `analysis`.
    pub fn with_analysis(mut self, file_name: &str, analysis: MapAnalysis) -> Self {
        self.analyses.insert(file_name.to_string(), analysis);
        self
    }

    /// Fail `analyze` for `file_name` with `error`.
    pub fn with_failure(mut self, file_name: &str, error: AnalyzerError) -> Self {
        self.failures.insert(file_name.to_string(), error);
        self
    }

    /// Answer `render_preview` for `file_name` with `png` bytes.
    pub fn with_preview(mut self, file_name: &str, png: Vec<u8>) -> Self {
        self.previews.insert(file_name.to_string(), png);
        self
    }
}

fn file_name(package: &Path) -> String {
    package
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl MapAnalyzer for MockAnalyzer {
    fn analyze(&self, package: &Path) -> Result<MapAnalysis, AnalyzerError> {
        let key = file_name(package);
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }
        self.analyses.get(&key).cloned().ok_or_else(|| {
            AnalyzerError::Unavailable(format!("no mock analysis registered for '{key}'"))
        })
    }

    fn render_preview(&self, package: &Path) -> Result<Option<Vec<u8>>, AnalyzerError> {
        Ok(self.previews.get(&file_name(package)).cloned())
    }
}

/// A fully-populated, warning-free analysis for a `players`-slot map.
///
/// Single author "Alice", CC0 license, symmetric balance across all nine
/// categories, one HQ per slot.
pub fn sample_analysis(name: &str, players: u8) -> MapAnalysis {
    let balance: BTreeMap<String, BalanceCounts> = BalanceCategory::ALL
        .iter()
        .map(|category| {
            (
                category.key().to_string(),
                BalanceCounts {
                    eq: true,
                    min: 1,
                    max: 1,
                },
            )
        })
        .collect();

    MapAnalysis {
        name: name.to_string(),
        players,
        author: Some("Alice".to_string()),
        additional_authors: Vec::new(),
        license: Some("CC0-1.0".to_string()),
        mapsize: MapSize { w: 128, h: 128 },
        scavenger_units: 0,
        scavenger_structures: 0,
        oil_wells: 4 * players as u32,
        balance,
        hq: (0..players)
            .map(|slot| {
                Some(TilePos {
                    x: 8 + 12 * slot as u32,
                    y: 8 + 12 * slot as u32,
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn mock_analyzer_answers_by_file_name() {
        let analyzer = MockAnalyzer::new()
            .with_analysis("alpha.wz", sample_analysis("Alpha", 2))
            .with_failure(
                "broken.wz",
                AnalyzerError::MalformedPackage("bad zip".to_string()),
            );

        let analysis = analyzer.analyze(&PathBuf::from("/tmp/alpha.wz")).unwrap();
        assert_eq!(analysis.name, "Alpha");

        let err = analyzer
            .analyze(&PathBuf::from("/tmp/broken.wz"))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedPackage(_)));

        let err = analyzer
            .analyze(&PathBuf::from("/tmp/unknown.wz"))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Unavailable(_)));
    }

    #[test]
    fn preview_defaults_to_absent() {
        let analyzer = MockAnalyzer::new().with_preview("alpha.wz", vec![1, 2, 3]);
        assert_eq!(
            analyzer
                .render_preview(&PathBuf::from("alpha.wz"))
                .unwrap(),
            Some(vec![1, 2, 3])
        );
        assert_eq!(
            analyzer.render_preview(&PathBuf::from("beta.wz")).unwrap(),
            None
        );
    }
}
