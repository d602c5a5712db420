//! Map record: the primary definable in the map database.
//!
//! A `MapRecord` describes exactly one version of one map, keyed by the
//! content hash of its package bytes. Records are immutable after
//! creation: a re-uploaded map produces a new record that supersedes the
//! old logical-key binding, never an in-place edit.

use crate::identity::ContentHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical description of one map version, in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRecord {
    pub name: String,
    /// Player slot count, 2..=10. Must equal the owning repository's
    /// expected player count.
    pub slots: u8,
    pub author: Authors,
    /// SPDX-style license expression. Checked for token well-formedness
    /// only, never semantically.
    pub license: String,
    pub size: MapSize,
    pub scavenger_count: u32,
    pub oil_wells: u32,
    pub balance: PlayerBalance,
    /// One entry per player slot, in slot order. Entries without a known
    /// HQ serialize as an empty array.
    pub hq_locations: Vec<HqEntry>,
    pub download: DownloadInfo,
}

impl MapRecord {
    /// Content identity of the map package this record describes.
    pub fn content_hash(&self) -> &ContentHash {
        &self.download.content_hash
    }

    /// Logical key: the (repository, path) slot this record occupies.
    pub fn logical_key(&self) -> (&str, &str) {
        (&self.download.repo_id, &self.download.path)
    }

    /// True when `other` carries the same content apart from volatile
    /// download metadata (`uploadedAt`).
    pub fn same_content(&self, other: &MapRecord) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.download.uploaded_at = String::new();
        b.download.uploaded_at = String::new();
        a == b
    }
}

/// One author name, or an ordered list of several.
///
/// The shape is purely a function of count: a single author is stored as
/// a scalar, multiple authors as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    One(String),
    Many(Vec<String>),
}

impl Authors {
    /// Normalize a name sequence: drop empties, deduplicate preserving
    /// first-seen order, collapse to a scalar when one remains.
    ///
    /// Returns `None` when no usable name survives.
    pub fn from_names(names: impl IntoIterator<Item = String>) -> Option<Authors> {
        let mut seen = Vec::new();
        for name in names {
            if !name.is_empty() && !seen.contains(&name) {
                seen.push(name);
            }
        }
        match seen.len() {
            0 => None,
            1 => seen.into_iter().next().map(Authors::One),
            _ => Some(Authors::Many(seen)),
        }
    }

    /// All author names in order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Authors::One(name) => vec![name.as_str()],
            Authors::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Map dimensions in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub w: u32,
    pub h: u32,
}

/// A tile coordinate, serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

impl From<(u32, u32)> for TilePos {
    fn from((x, y): (u32, u32)) -> Self {
        TilePos { x, y }
    }
}

impl From<TilePos> for (u32, u32) {
    fn from(pos: TilePos) -> Self {
        (pos.x, pos.y)
    }
}

/// One player's HQ location, or an empty array when the map has none for
/// that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct HqEntry(pub Option<TilePos>);

impl TryFrom<Vec<u32>> for HqEntry {
    type Error = String;

    fn try_from(coords: Vec<u32>) -> Result<Self, Self::Error> {
        match coords.as_slice() {
            [] => Ok(HqEntry(None)),
            [x, y] => Ok(HqEntry(Some(TilePos { x: *x, y: *y }))),
            other => Err(format!("expected [] or [x, y], got {} elements", other.len())),
        }
    }
}

impl From<HqEntry> for Vec<u32> {
    fn from(entry: HqEntry) -> Self {
        match entry.0 {
            Some(pos) => vec![pos.x, pos.y],
            None => Vec::new(),
        }
    }
}

/// Per-category balance facts: symmetry assertion plus raw count bounds.
///
/// `eq = true` asserts both count and type symmetry across all player
/// slots; `min`/`max` bound raw counts independent of symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCounts {
    pub eq: bool,
    pub min: u32,
    pub max: u32,
}

/// The fixed set of gameplay-resource classes checked for per-player
/// symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceCategory {
    Units,
    Structures,
    ResourceExtractors,
    PowerGenerators,
    RegularFactories,
    VtolFactories,
    CyborgFactories,
    ResearchCenters,
    DefensiveStructures,
}

impl BalanceCategory {
    pub const ALL: [BalanceCategory; 9] = [
        BalanceCategory::Units,
        BalanceCategory::Structures,
        BalanceCategory::ResourceExtractors,
        BalanceCategory::PowerGenerators,
        BalanceCategory::RegularFactories,
        BalanceCategory::VtolFactories,
        BalanceCategory::CyborgFactories,
        BalanceCategory::ResearchCenters,
        BalanceCategory::DefensiveStructures,
    ];

    /// Wire key for this category.
    pub fn key(&self) -> &'static str {
        match self {
            BalanceCategory::Units => "units",
            BalanceCategory::Structures => "structures",
            BalanceCategory::ResourceExtractors => "resourceExtractors",
            BalanceCategory::PowerGenerators => "powerGenerators",
            BalanceCategory::RegularFactories => "regularFactories",
            BalanceCategory::VtolFactories => "vtolFactories",
            BalanceCategory::CyborgFactories => "cyborgFactories",
            BalanceCategory::ResearchCenters => "researchCenters",
            BalanceCategory::DefensiveStructures => "defensiveStructures",
        }
    }
}

/// Per-player balance across all nine fixed categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBalance {
    pub units: BalanceCounts,
    pub structures: BalanceCounts,
    pub resource_extractors: BalanceCounts,
    pub power_generators: BalanceCounts,
    pub regular_factories: BalanceCounts,
    pub vtol_factories: BalanceCounts,
    pub cyborg_factories: BalanceCounts,
    pub research_centers: BalanceCounts,
    pub defensive_structures: BalanceCounts,
}

impl PlayerBalance {
    /// Assemble from a category-keyed map.
    ///
    /// Errors with the wire key of the first missing category. Missing
    /// keys are never default-filled.
    pub fn from_map(map: &BTreeMap<String, BalanceCounts>) -> Result<Self, &'static str> {
        let get = |cat: BalanceCategory| map.get(cat.key()).copied().ok_or(cat.key());
        Ok(PlayerBalance {
            units: get(BalanceCategory::Units)?,
            structures: get(BalanceCategory::Structures)?,
            resource_extractors: get(BalanceCategory::ResourceExtractors)?,
            power_generators: get(BalanceCategory::PowerGenerators)?,
            regular_factories: get(BalanceCategory::RegularFactories)?,
            vtol_factories: get(BalanceCategory::VtolFactories)?,
            cyborg_factories: get(BalanceCategory::CyborgFactories)?,
            research_centers: get(BalanceCategory::ResearchCenters)?,
            defensive_structures: get(BalanceCategory::DefensiveStructures)?,
        })
    }

    /// Counts by category, in canonical order.
    pub fn by_category(&self) -> [(BalanceCategory, BalanceCounts); 9] {
        [
            (BalanceCategory::Units, self.units),
            (BalanceCategory::Structures, self.structures),
            (BalanceCategory::ResourceExtractors, self.resource_extractors),
            (BalanceCategory::PowerGenerators, self.power_generators),
            (BalanceCategory::RegularFactories, self.regular_factories),
            (BalanceCategory::VtolFactories, self.vtol_factories),
            (BalanceCategory::CyborgFactories, self.cyborg_factories),
            (BalanceCategory::ResearchCenters, self.research_centers),
            (BalanceCategory::DefensiveStructures, self.defensive_structures),
        ]
    }
}

/// Where and how to fetch the packaged map file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfo {
    pub repo_id: String,
    pub path: String,
    pub uploaded_at: String,
    pub content_hash: ContentHash,
    pub byte_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_author_serializes_as_scalar() {
        let authors = Authors::from_names(vec!["Alice".to_string()]).unwrap();
        assert_eq!(serde_json::to_value(&authors).unwrap(), json!("Alice"));
    }

    #[test]
    fn multiple_authors_serialize_as_ordered_list() {
        let authors = Authors::from_names(vec![
            "Alice".to_string(),
            "Bob".to_string(),
            "Alice".to_string(),
            String::new(),
        ])
        .unwrap();
        assert_eq!(
            serde_json::to_value(&authors).unwrap(),
            json!(["Alice", "Bob"])
        );
    }

    #[test]
    fn no_usable_author_names_is_none() {
        assert_eq!(Authors::from_names(vec![String::new()]), None);
    }

    #[test]
    fn hq_entry_round_trips_through_pair_and_empty_forms() {
        let present: HqEntry = serde_json::from_str("[3,7]").unwrap();
        assert_eq!(present, HqEntry(Some(TilePos { x: 3, y: 7 })));
        let absent: HqEntry = serde_json::from_str("[]").unwrap();
        assert_eq!(absent, HqEntry(None));
        assert_eq!(serde_json::to_string(&present).unwrap(), "[3,7]");
        assert_eq!(serde_json::to_string(&absent).unwrap(), "[]");
        assert!(serde_json::from_str::<HqEntry>("[1,2,3]").is_err());
    }

    #[test]
    fn player_balance_requires_all_nine_categories() {
        let mut map = BTreeMap::new();
        for cat in BalanceCategory::ALL {
            map.insert(
                cat.key().to_string(),
                BalanceCounts {
                    eq: true,
                    min: 1,
                    max: 1,
                },
            );
        }
        assert!(PlayerBalance::from_map(&map).is_ok());

        map.remove("defensiveStructures");
        assert_eq!(PlayerBalance::from_map(&map), Err("defensiveStructures"));
    }

    #[test]
    fn record_wire_form_uses_camel_case_keys() {
        let record = MapRecord {
            name: "Test-Map".to_string(),
            slots: 2,
            author: Authors::One("Alice".to_string()),
            license: "CC0-1.0".to_string(),
            size: MapSize { w: 64, h: 64 },
            scavenger_count: 0,
            oil_wells: 8,
            balance: PlayerBalance::from_map(
                &BalanceCategory::ALL
                    .iter()
                    .map(|c| {
                        (
                            c.key().to_string(),
                            BalanceCounts {
                                eq: true,
                                min: 1,
                                max: 1,
                            },
                        )
                    })
                    .collect(),
            )
            .unwrap(),
            hq_locations: vec![
                HqEntry(Some(TilePos { x: 4, y: 4 })),
                HqEntry(Some(TilePos { x: 60, y: 60 })),
            ],
            download: DownloadInfo {
                repo_id: "8p".to_string(),
                path: "maps/test.wz".to_string(),
                uploaded_at: "2024-01-01".to_string(),
                content_hash: ContentHash("ab".repeat(32)),
                byte_size: 1024,
            },
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["scavengerCount"], json!(0));
        assert_eq!(value["oilWells"], json!(8));
        assert_eq!(value["hqLocations"], json!([[4, 4], [60, 60]]));
        assert_eq!(value["balance"]["resourceExtractors"]["eq"], json!(true));
        assert_eq!(value["download"]["repoId"], json!("8p"));
        assert_eq!(value["download"]["byteSize"], json!(1024));

        let back: MapRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
        assert!(back.same_content(&record));
    }
}
