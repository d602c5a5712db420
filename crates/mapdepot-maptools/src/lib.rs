//! Maptools adapter for package analysis and preview rendering.
//!
//! This crate is intentionally thin: it shells out to `maptools` for
//! structural facts about a package and keeps no validation policy of
//! its own. Policy lives in `mapdepot-kernel::validate`.

use mapdepot_kernel::{AnalyzerError, BalanceCategory, BalanceCounts, MapAnalysis, MapAnalyzer, MapSize, TilePos};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Thin client around the `maptools` CLI.
#[derive(Debug, Clone)]
pub struct MaptoolsClient {
    exe: PathBuf,
}

impl Default for MaptoolsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MaptoolsClient {
    /// Client resolving `maptools` through PATH.
    pub fn new() -> Self {
        Self {
            exe: PathBuf::from("maptools"),
        }
    }

    /// Client using an explicit executable path.
    pub fn with_executable(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// Returns true if the executable answers `--version`.
    pub fn is_available(&self) -> bool {
        Command::new(&self.exe)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, AnalyzerError> {
        let output = Command::new(&self.exe).args(args).output().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                AnalyzerError::Unavailable(format!("{} not found in PATH", self.exe.display()))
            } else {
                AnalyzerError::Unavailable(err.to_string())
            }
        })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("maptools {} exited with {}", args.join(" "), output.status)
            } else {
                stderr
            };
            Err(AnalyzerError::MalformedPackage(message))
        }
    }
}

impl MapAnalyzer for MaptoolsClient {
    fn analyze(&self, package: &Path) -> Result<MapAnalysis, AnalyzerError> {
        let package = package.to_str().ok_or_else(|| {
            AnalyzerError::Unavailable(format!("non-UTF-8 package path: {}", package.display()))
        })?;
        let stdout = self.run(&["package", "info", "--map-seed=0", package])?;
        parse_map_info(&stdout)
    }

    /// `maptools package genpreview` into a scratch file. A failed
    /// render is reported as no preview, matching the published
    /// database where previews are best-effort.
    fn render_preview(&self, package: &Path) -> Result<Option<Vec<u8>>, AnalyzerError> {
        let Some(package) = package.to_str() else {
            return Ok(None);
        };
        let scratch = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| AnalyzerError::Unavailable(e.to_string()))?;
        let Some(out_path) = scratch.path().to_str().map(str::to_string) else {
            return Ok(None);
        };
        let rendered = self.run(&[
            "package",
            "genpreview",
            "--playercolors=wz",
            "--map-seed=0",
            package,
            &out_path,
        ]);
        match rendered {
            Ok(_) => Ok(std::fs::read(scratch.path()).ok().filter(|b| !b.is_empty())),
            Err(AnalyzerError::Unavailable(message)) => Err(AnalyzerError::Unavailable(message)),
            Err(_) => Ok(None),
        }
    }
}

/// Parse `maptools package info` JSON output into analysis facts.
pub fn parse_map_info(stdout: &[u8]) -> Result<MapAnalysis, AnalyzerError> {
    let raw: RawMapInfo =
        serde_json::from_slice(stdout).map_err(|e| AnalyzerError::Parse(e.to_string()))?;

    // Balance facts are only usable when both the equality flag and
    // the per-player counts are present for a category; partial data
    // is dropped here and surfaces as a missing category downstream.
    let mut balance = BTreeMap::new();
    for category in BalanceCategory::ALL {
        let raw_key = raw_balance_key(category);
        if let (Some(eq), Some(counts)) = (
            raw.balance.start_equality.get(raw_key),
            raw.player.get(raw_key),
        ) {
            balance.insert(
                category.key().to_string(),
                BalanceCounts {
                    eq: *eq,
                    min: counts.min,
                    max: counts.max,
                },
            );
        }
    }

    Ok(MapAnalysis {
        name: raw.name,
        players: raw.players,
        author: raw.author.map(|a| a.name),
        additional_authors: raw.additional_authors.into_iter().map(|a| a.name).collect(),
        license: raw.license,
        mapsize: raw.mapsize,
        scavenger_units: raw.scavenger.units,
        scavenger_structures: raw.scavenger.structures,
        oil_wells: raw.oil_wells,
        balance,
        hq: raw
            .hq
            .into_iter()
            .map(|entry| match (entry.x, entry.y) {
                (Some(x), Some(y)) => Some(TilePos { x, y }),
                _ => None,
            })
            .collect(),
    })
}

/// Key a category carries in raw maptools output. Two categories were
/// renamed for publication.
fn raw_balance_key(category: BalanceCategory) -> &'static str {
    match category {
        BalanceCategory::RegularFactories => "regFactories",
        BalanceCategory::DefensiveStructures => "defenseStructures",
        other => other.key(),
    }
}

#[derive(Debug, Deserialize)]
struct RawMapInfo {
    name: String,
    players: u8,
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(default, rename = "additionalAuthors")]
    additional_authors: Vec<RawAuthor>,
    #[serde(default)]
    license: Option<String>,
    mapsize: MapSize,
    #[serde(default)]
    scavenger: RawScavenger,
    #[serde(rename = "oilWells")]
    oil_wells: u32,
    balance: RawBalance,
    #[serde(default)]
    player: BTreeMap<String, RawMinMax>,
    #[serde(default)]
    hq: Vec<RawHq>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawScavenger {
    #[serde(default)]
    units: u32,
    #[serde(default)]
    structures: u32,
}

#[derive(Debug, Deserialize)]
struct RawBalance {
    #[serde(rename = "startEquality")]
    start_equality: BTreeMap<String, bool>,
}

#[derive(Debug, Deserialize)]
struct RawMinMax {
    min: u32,
    max: u32,
}

#[derive(Debug, Default, Deserialize)]
struct RawHq {
    #[serde(default)]
    x: Option<u32>,
    #[serde(default)]
    y: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_fixture() -> String {
        let categories = [
            "units",
            "structures",
            "resourceExtractors",
            "powerGenerators",
            "regFactories",
            "vtolFactories",
            "cyborgFactories",
            "researchCenters",
            "defenseStructures",
        ];
        let eq: Vec<String> = categories.iter().map(|c| format!("\"{c}\":true")).collect();
        let counts: Vec<String> = categories
            .iter()
            .map(|c| format!("\"{c}\":{{\"min\":1,\"max\":2}}"))
            .collect();
        format!(
            r#"{{
                "name": "Sharp-Divide",
                "type": "skirmish",
                "players": 2,
                "author": {{"name": "Alice"}},
                "additionalAuthors": [{{"name": "Bob"}}],
                "license": "CC0-1.0",
                "mapsize": {{"w": 128, "h": 128}},
                "scavenger": {{"units": 3, "structures": 5}},
                "oilWells": 16,
                "balance": {{"startEquality": {{{}}}}},
                "player": {{{}}},
                "hq": [{{"x": 4, "y": 4}}, {{}}]
            }}"#,
            eq.join(","),
            counts.join(",")
        )
    }

    #[test]
    fn parses_raw_info_into_analysis_facts() {
        let analysis = parse_map_info(raw_fixture().as_bytes()).unwrap();
        assert_eq!(analysis.name, "Sharp-Divide");
        assert_eq!(analysis.players, 2);
        assert_eq!(analysis.author.as_deref(), Some("Alice"));
        assert_eq!(analysis.additional_authors, vec!["Bob".to_string()]);
        assert_eq!(analysis.scavenger_units, 3);
        assert_eq!(analysis.scavenger_structures, 5);
        assert_eq!(analysis.oil_wells, 16);
        assert_eq!(analysis.hq, vec![Some(TilePos { x: 4, y: 4 }), None]);
        // Renamed categories land under their published keys.
        assert!(analysis.balance.contains_key("regularFactories"));
        assert!(analysis.balance.contains_key("defensiveStructures"));
        assert_eq!(analysis.balance.len(), 9);
        assert_eq!(analysis.balance["units"].min, 1);
        assert_eq!(analysis.balance["units"].max, 2);
    }

    #[test]
    fn partial_balance_data_drops_the_category() {
        let fixture = raw_fixture().replace(r#""regFactories":true"#, r#""somethingElse":true"#);
        let analysis = parse_map_info(fixture.as_bytes()).unwrap();
        assert!(!analysis.balance.contains_key("regularFactories"));
        assert_eq!(analysis.balance.len(), 8);
    }

    #[test]
    fn unparseable_output_is_a_parse_error() {
        assert!(matches!(
            parse_map_info(b"not json"),
            Err(AnalyzerError::Parse(_))
        ));
    }
}
