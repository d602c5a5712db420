//! The map database store and its public document forms.
//!
//! ```text
//!   MapRecord upserts          page documents on disk
//!        |                            ^
//!        v                            |
//!   DatabaseStore --- repaginate ---> Vec<PageDocument> + VersionIndexDocument
//! ```
//!
//! The store holds the full ordered record collection in memory; the
//! pagination layer slices it into fixed-capacity pages and mints
//! per-page version tokens that only move when a page's contents move.

pub mod page;
pub mod paginate;
pub mod persist;
pub mod store;
pub mod urls;

pub use page::{PageDocument, PageLinks, PageVersion, VersionIndexDocument};
pub use paginate::{PaginationMode, build_version_index, repaginate, version_token};
pub use persist::{PersistError, load_pages, write_pages, write_version_index};
pub use store::{DatabaseStore, StoreError, SupersededEntry, UpsertOutcome};
pub use urls::{PublicUrls, UrlConfigError, expand_template};

/// Default number of map records per page document.
pub const DEFAULT_PAGE_CAPACITY: usize = 3000;
