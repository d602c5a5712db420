//! In-memory record collection with content-hash identity and
//! logical-key supersession.
//!
//! Invariants:
//! - one live record per content hash, one live record per (repoId, path)
//! - superseded records leave the live order but stay retrievable
//! - live order is append-at-end, never re-sorted

use mapdepot_kernel::{ContentHash, MapRecord};
use std::collections::BTreeMap;

/// Result of offering a record to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New content hash, new logical key.
    Inserted,
    /// New content hash displacing an older record at the same
    /// (repoId, path). The old record is retained for audit.
    Superseded { old: ContentHash },
    /// The hash is already present with identical content. No-op.
    Unchanged,
}

/// A record displaced from its logical key, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupersededEntry {
    pub record: MapRecord,
    pub replaced_by: ContentHash,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Same content hash, divergent record content. Either a SHA-256
    /// collision or corrupted state; both are unrecoverable.
    #[error("persistence conflict: hash {hash} already maps to divergent content")]
    PersistenceConflict { hash: ContentHash },
}

/// The full map database, ordered and indexed.
#[derive(Debug, Default, Clone)]
pub struct DatabaseStore {
    /// Every record ever accepted, live or superseded, by hash hex.
    records: BTreeMap<String, MapRecord>,
    /// Live records in insertion order.
    order: Vec<ContentHash>,
    /// Live binding of (repoId, path) to content hash.
    logical: BTreeMap<(String, String), ContentHash>,
    superseded: Vec<SupersededEntry>,
}

impl DatabaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously published records, in their
    /// published order. Supersession history does not survive a reload.
    pub fn from_records(
        records: impl IntoIterator<Item = MapRecord>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for record in records {
            store.upsert(record)?;
        }
        Ok(store)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Offer a record. Identity is the content hash; the logical key is
    /// a secondary uniqueness constraint resolved by supersession.
    pub fn upsert(&mut self, record: MapRecord) -> Result<UpsertOutcome, StoreError> {
        let hash = record.content_hash().clone();
        if let Some(existing) = self.records.get(hash.as_str()) {
            if existing.same_content(&record) {
                return Ok(UpsertOutcome::Unchanged);
            }
            return Err(StoreError::PersistenceConflict { hash });
        }

        let (repo_id, path) = record.logical_key();
        let key = (repo_id.to_string(), path.to_string());
        let displaced = self.logical.insert(key, hash.clone());

        self.records.insert(hash.as_str().to_string(), record);
        self.order.push(hash.clone());

        match displaced {
            Some(old) => {
                self.order.retain(|h| h != &old);
                let old_record = self.records[old.as_str()].clone();
                self.superseded.push(SupersededEntry {
                    record: old_record,
                    replaced_by: hash,
                });
                Ok(UpsertOutcome::Superseded { old })
            }
            None => Ok(UpsertOutcome::Inserted),
        }
    }

    /// Look up any record, live or superseded, by content hash.
    pub fn get(&self, hash: &ContentHash) -> Option<&MapRecord> {
        self.records.get(hash.as_str())
    }

    /// The live record currently bound to a (repoId, path) key.
    pub fn get_by_logical_key(&self, repo_id: &str, path: &str) -> Option<&MapRecord> {
        let key = (repo_id.to_string(), path.to_string());
        self.logical.get(&key).and_then(|hash| self.get(hash))
    }

    /// True when the hash is known, live or superseded.
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.records.contains_key(hash.as_str())
    }

    /// Live records in insertion order.
    pub fn records_ordered(&self) -> impl Iterator<Item = &MapRecord> {
        self.order.iter().map(|hash| &self.records[hash.as_str()])
    }

    /// Records displaced during this store's lifetime, oldest first.
    pub fn superseded(&self) -> &[SupersededEntry] {
        &self.superseded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapdepot_kernel::{
        Authors, BalanceCategory, BalanceCounts, DownloadInfo, HqEntry, MapSize, PlayerBalance,
        TilePos,
    };
    use std::collections::BTreeMap;

    fn record(name: &str, repo_id: &str, path: &str, hash_byte: &str) -> MapRecord {
        let balance: BTreeMap<String, BalanceCounts> = BalanceCategory::ALL
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
            .collect();
        MapRecord {
            name: name.to_string(),
            slots: 2,
            author: Authors::One("Alice".to_string()),
            license: "CC0-1.0".to_string(),
            size: MapSize { w: 64, h: 64 },
            scavenger_count: 0,
            oil_wells: 8,
            balance: PlayerBalance::from_map(&balance).unwrap(),
            hq_locations: vec![
                HqEntry(Some(TilePos { x: 4, y: 4 })),
                HqEntry(Some(TilePos { x: 60, y: 60 })),
            ],
            download: DownloadInfo {
                repo_id: repo_id.to_string(),
                path: path.to_string(),
                uploaded_at: "2024-01-01 00:00:00".to_string(),
                content_hash: ContentHash(hash_byte.repeat(32)),
                byte_size: 1024,
            },
        }
    }

    #[test]
    fn insert_then_reoffer_is_unchanged() {
        let mut store = DatabaseStore::new();
        let rec = record("Alpha", "2p", "maps/alpha.wz", "aa");
        assert_eq!(store.upsert(rec.clone()).unwrap(), UpsertOutcome::Inserted);

        let mut reoffer = rec.clone();
        reoffer.download.uploaded_at = "2025-06-01 12:00:00".to_string();
        assert_eq!(store.upsert(reoffer).unwrap(), UpsertOutcome::Unchanged);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn same_logical_key_supersedes_and_retains_old_record() {
        let mut store = DatabaseStore::new();
        let old = record("Alpha", "2p", "maps/alpha.wz", "aa");
        let new = record("Alpha", "2p", "maps/alpha.wz", "bb");
        let old_hash = old.content_hash().clone();
        let new_hash = new.content_hash().clone();

        store.upsert(old.clone()).unwrap();
        assert_eq!(
            store.upsert(new.clone()).unwrap(),
            UpsertOutcome::Superseded {
                old: old_hash.clone()
            }
        );

        assert_eq!(store.len(), 1);
        assert_eq!(
            store
                .get_by_logical_key("2p", "maps/alpha.wz")
                .unwrap()
                .content_hash(),
            &new_hash
        );
        // Audit trail keeps the displaced record reachable by hash.
        assert_eq!(store.get(&old_hash), Some(&old));
        assert_eq!(store.superseded().len(), 1);
        assert_eq!(store.superseded()[0].replaced_by, new_hash);
    }

    #[test]
    fn supersession_appends_at_end_of_order() {
        let mut store = DatabaseStore::new();
        store
            .upsert(record("Alpha", "2p", "maps/alpha.wz", "aa"))
            .unwrap();
        store
            .upsert(record("Beta", "2p", "maps/beta.wz", "bb"))
            .unwrap();
        store
            .upsert(record("Alpha-v2", "2p", "maps/alpha.wz", "cc"))
            .unwrap();

        let names: Vec<&str> = store.records_ordered().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha-v2"]);
    }

    #[test]
    fn divergent_content_under_one_hash_is_a_conflict() {
        let mut store = DatabaseStore::new();
        store
            .upsert(record("Alpha", "2p", "maps/alpha.wz", "aa"))
            .unwrap();
        let mut imposter = record("Gamma", "2p", "maps/gamma.wz", "aa");
        imposter.oil_wells = 99;
        assert!(matches!(
            store.upsert(imposter),
            Err(StoreError::PersistenceConflict { .. })
        ));
    }

    #[test]
    fn from_records_preserves_published_order() {
        let records = vec![
            record("Beta", "2p", "maps/beta.wz", "bb"),
            record("Alpha", "2p", "maps/alpha.wz", "aa"),
        ];
        let store = DatabaseStore::from_records(records).unwrap();
        let names: Vec<&str> = store.records_ordered().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }
}
