//! Map repository access: descriptors, source control, candidate
//! scanning, and per-repository watermarks.

pub mod local;
pub mod memory;
pub mod repo;
pub mod scanner;
pub mod source;
pub mod watermark;

pub use local::LocalRepoSource;
pub use memory::MemorySource;
pub use repo::{RepoConfigError, RepoDescriptor, load_repos_config};
pub use scanner::{Candidate, ScanMode, scan_candidates};
pub use source::{SourceControl, SourceError};
pub use watermark::{WatermarkError, WatermarkSet};
