//! Public URL scheme for published documents, and `{{json/pointer}}`
//! template expansion for asset URLs.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum UrlConfigError {
    #[error("URL config is not a JSON object")]
    NotAnObject,
    #[error("URL config is missing the 'asset-url-templates' key")]
    MissingAssetUrlTemplates,
}

/// Site-root-relative URL layout for published documents.
///
/// `data_root_relurl` is the path under the site root where the data
/// tree is served, e.g. `"api"` puts page 1 at `/api/v1/full.json`.
#[derive(Debug, Clone)]
pub struct PublicUrls {
    data_root_components: Vec<String>,
    asset_url_templates: Value,
}

impl PublicUrls {
    /// Build from the URLs config document. The config must carry an
    /// `asset-url-templates` key; its value is passed through verbatim
    /// into every page document.
    pub fn from_config(config: &Value, data_root_relurl: &str) -> Result<Self, UrlConfigError> {
        let object = config.as_object().ok_or(UrlConfigError::NotAnObject)?;
        let asset_url_templates = object
            .get("asset-url-templates")
            .cloned()
            .ok_or(UrlConfigError::MissingAssetUrlTemplates)?;
        Ok(PublicUrls {
            data_root_components: data_root_relurl
                .split('/')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
            asset_url_templates,
        })
    }

    pub fn asset_url_templates(&self) -> &Value {
        &self.asset_url_templates
    }

    /// Path components of the 1-based page under the data root.
    pub fn page_path_components(pagenum: usize) -> Vec<String> {
        if pagenum <= 1 {
            vec!["v1".to_string(), "full.json".to_string()]
        } else {
            vec![
                "v1".to_string(),
                "full".to_string(),
                "page".to_string(),
                format!("{pagenum}.json"),
            ]
        }
    }

    /// Path components of the version index under the data root.
    pub fn versions_path_components() -> Vec<String> {
        vec!["v1".to_string(), "versions.json".to_string()]
    }

    /// Site-root-relative URL of the 1-based page.
    pub fn page_url(&self, pagenum: usize) -> String {
        self.join(Self::page_path_components(pagenum))
    }

    fn join(&self, components: Vec<String>) -> String {
        let mut all = self.data_root_components.clone();
        all.extend(components);
        format!("/{}", all.join("/"))
    }
}

/// Expand `{{json/pointer}}` tokens in `template` against `map_info`.
///
/// The pointer is RFC-6901 without the leading slash (`~1` = `/`,
/// `~0` = `~`). Pointers that do not resolve to a scalar leave the
/// literal token text in place.
pub fn expand_template(template: &str, map_info: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let pointer = &after[..end];
                match resolve_pointer(map_info, pointer) {
                    Some(text) => out.push_str(&text),
                    None => {
                        out.push_str("{{");
                        out.push_str(pointer);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated token, keep the remainder as-is.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_pointer(root: &Value, pointer: &str) -> Option<String> {
    let mut current = root;
    for segment in pointer.split('/') {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn urls() -> PublicUrls {
        let config = json!({"asset-url-templates": {"info": "x"}});
        PublicUrls::from_config(&config, "api").unwrap()
    }

    #[test]
    fn page_urls_follow_the_v1_layout() {
        let urls = urls();
        assert_eq!(urls.page_url(1), "/api/v1/full.json");
        assert_eq!(urls.page_url(2), "/api/v1/full/page/2.json");
        assert_eq!(urls.page_url(17), "/api/v1/full/page/17.json");
    }

    #[test]
    fn empty_data_root_yields_root_relative_urls() {
        let config = json!({"asset-url-templates": {}});
        let urls = PublicUrls::from_config(&config, "").unwrap();
        assert_eq!(urls.page_url(1), "/v1/full.json");
    }

    #[test]
    fn config_without_templates_is_rejected() {
        assert!(matches!(
            PublicUrls::from_config(&json!({}), ""),
            Err(UrlConfigError::MissingAssetUrlTemplates)
        ));
        assert!(matches!(
            PublicUrls::from_config(&json!([]), ""),
            Err(UrlConfigError::NotAnObject)
        ));
    }

    #[test]
    fn template_expansion_resolves_pointers() {
        let info = json!({
            "name": "Sharp-Divide",
            "download": {"path": "maps/sharp.wz", "byteSize": 4096},
            "hq": [[4, 4]]
        });
        assert_eq!(
            expand_template("https://cdn.test/{{download/path}}", &info),
            "https://cdn.test/maps/sharp.wz"
        );
        assert_eq!(
            expand_template("{{name}}-{{download/byteSize}}", &info),
            "Sharp-Divide-4096"
        );
    }

    #[test]
    fn unresolvable_pointer_keeps_the_literal_token() {
        let info = json!({"name": "Alpha"});
        assert_eq!(
            expand_template("x/{{missing/key}}/y", &info),
            "x/{{missing/key}}/y"
        );
        // Composite values are not substitutable either.
        let info = json!({"hq": [[1, 2]]});
        assert_eq!(expand_template("{{hq}}", &info), "{{hq}}");
        assert_eq!(expand_template("{{hq/0/1}}", &info), "2");
    }

    #[test]
    fn escaped_pointer_segments_unescape() {
        let info = json!({"a/b": {"c~d": "hit"}});
        assert_eq!(expand_template("{{a~1b/c~0d}}", &info), "hit");
    }
}
