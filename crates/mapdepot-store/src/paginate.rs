//! Slicing the store into fixed-capacity pages and minting version
//! tokens that move only when a page's contents move.

use crate::page::{PAGE_DOC_TYPE, PageDocument, PageLinks, PageVersion, VERSIONS_DOC_TYPE, VersionIndexDocument};
use crate::store::DatabaseStore;
use crate::urls::PublicUrls;
use chrono::{DateTime, Utc};
use mapdepot_kernel::MapRecord;

/// Whether a run may carry tokens over from the previous page set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// Keep a page's previous token when its maps array is unchanged.
    PreserveUnchanged,
    /// Mint fresh tokens for every page (full rebuild).
    FreshTokens,
}

/// Version token for a point in time, UTC, second precision.
pub fn version_token(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Slice the store's ordered records into page documents.
///
/// A page's `version` is carried over from `previous` verbatim iff the
/// page at the same index held an identical maps array; links are
/// always recomputed so a page gaining a successor gains its `next`
/// link without a token change. There is always at least one page.
pub fn repaginate(
    store: &DatabaseStore,
    previous: &[PageDocument],
    urls: &PublicUrls,
    capacity: usize,
    token: &str,
    mode: PaginationMode,
) -> Vec<PageDocument> {
    let capacity = capacity.max(1);
    let records: Vec<MapRecord> = store.records_ordered().cloned().collect();
    let page_count = records.len().div_ceil(capacity).max(1);

    let mut pages = Vec::with_capacity(page_count);
    for pagenum in 1..=page_count {
        let start = (pagenum - 1) * capacity;
        let end = (start + capacity).min(records.len());
        let maps = records.get(start..end).unwrap_or_default().to_vec();

        let version = match mode {
            PaginationMode::PreserveUnchanged => previous
                .get(pagenum - 1)
                .filter(|prev| prev.maps == maps)
                .map(|prev| prev.version.clone())
                .unwrap_or_else(|| token.to_string()),
            PaginationMode::FreshTokens => token.to_string(),
        };

        pages.push(PageDocument {
            doc_type: PAGE_DOC_TYPE.to_string(),
            id: PageDocument::page_id(pagenum),
            version,
            links: PageLinks {
                self_url: urls.page_url(pagenum),
                prev: (pagenum > 1).then(|| urls.page_url(pagenum - 1)),
                next: (pagenum < page_count).then(|| urls.page_url(pagenum + 1)),
            },
            asset_url_templates: urls.asset_url_templates().clone(),
            maps,
        });
    }
    pages
}

/// Regenerate the version index from the authoritative page set.
pub fn build_version_index(pages: &[PageDocument]) -> VersionIndexDocument {
    VersionIndexDocument {
        doc_type: VERSIONS_DOC_TYPE.to_string(),
        id: "versions".to_string(),
        versions: pages
            .iter()
            .map(|page| PageVersion {
                page: page.links.self_url.clone(),
                version: page.version.clone(),
            })
            .collect(),
    }
}
