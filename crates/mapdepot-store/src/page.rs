//! Published wire documents: paginated map pages and the version index.

use mapdepot_kernel::MapRecord;
use serde::{Deserialize, Serialize};

/// Document type tag carried by every map page.
pub const PAGE_DOC_TYPE: &str = "wz2100.mapdatabase.full.v1";
/// Document type tag carried by the version index.
pub const VERSIONS_DOC_TYPE: &str = "wz2100.mapdatabase.versions.v1";

/// One published page of the full map listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    /// `full-page-N`, 1-based.
    pub id: String,
    /// Opaque version token, stable while the page's maps are stable.
    pub version: String,
    pub links: PageLinks,
    /// Download and asset URL templates, passed through verbatim from
    /// the URL configuration.
    #[serde(rename = "asset-url-templates")]
    pub asset_url_templates: serde_json::Value,
    pub maps: Vec<MapRecord>,
}

/// Sibling navigation between pages, as site-root-relative URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// The version index: one entry per published page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionIndexDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub id: String,
    pub versions: Vec<PageVersion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVersion {
    /// The page's `links.self` URL.
    pub page: String,
    pub version: String,
}

impl PageDocument {
    /// Page id for the 1-based page number.
    pub fn page_id(pagenum: usize) -> String {
        format!("full-page-{pagenum}")
    }
}
