//! # Mapdepot Kernel
//!
//! Canonical model for one version of a community map and the rules that
//! admit it into the database:
//!
//! ```text
//! ContentHash            ← SHA-256 identity over exact package bytes
//!     │
//! MapAnalysis            ← Structural facts from the external analyzer
//!     │
//! validate::build_record ← Normalization + schema enforcement
//!     │
//! MapRecord              ← Immutable, content-addressed database entry
//! ```
//!
//! The analyzer itself is a black box behind the [`MapAnalyzer`] trait;
//! concrete adapters (subprocess, mock) live in other crates or in
//! [`mock`].

pub mod analyzer;
pub mod identity;
pub mod mock;
pub mod record;
pub mod validate;

pub use analyzer::{AnalyzerError, MapAnalysis, MapAnalyzer};
pub use identity::ContentHash;
pub use record::{
    Authors, BalanceCategory, BalanceCounts, DownloadInfo, HqEntry, MapRecord, MapSize,
    PlayerBalance, TilePos,
};
pub use validate::{ValidatedRecord, ValidationContext, ValidationFailure, build_record};
