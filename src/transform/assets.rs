//! Asset path rewriting.
//!
//! Cockpit stores upload paths relative to its storage root. This pass
//! makes them absolute: `path` fields gain the tenant-scoped
//! `/storage/uploads` prefix, and `src`/`href` attributes embedded in
//! string content gain the plain base URL. Prefixing an already-absolute
//! path produces a doubled `/storage/uploads` segment, which the final
//! collapse folds back to one — so the pass is idempotent.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use super::Transform;

const STORAGE_UPLOADS: &str = "/storage/uploads";
const DOUBLED_STORAGE_UPLOADS: &str = "/storage/uploads/storage/uploads/";

static ATTR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(src|href)="(/[^"]*storage[^"]*)""#).expect("attribute pattern is valid")
});

/// Rewrites storage-relative asset paths to absolute URLs.
pub struct AssetPathRewrite {
    base_url: String,
    scoped_base_url: String,
}

impl AssetPathRewrite {
    pub fn new(base_url: &str, tenant: Option<&str>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let scoped_base_url = match tenant {
            Some(tenant) => format!("{base_url}/:{tenant}"),
            None => base_url.clone(),
        };
        Self {
            base_url,
            scoped_base_url,
        }
    }

    fn walk(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if key == "path" {
                        if let Value::String(path) = child {
                            if path.starts_with('/') {
                                *path = format!(
                                    "{}{STORAGE_UPLOADS}{path}",
                                    self.scoped_base_url
                                );
                            }
                        }
                    }
                    self.walk(child);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.walk(item);
                }
            }
            Value::String(text) => {
                let rewritten = self.rewrite_text(text);
                if rewritten != *text {
                    *text = rewritten;
                }
            }
            _ => {}
        }
    }

    fn rewrite_text(&self, text: &str) -> String {
        let with_attrs = ATTR_PATTERN.replace_all(text, |caps: &Captures| {
            // Any tenant segment already in the captured path is kept.
            format!(r#"{}="{}{}""#, &caps[1], self.base_url, &caps[2])
        });
        collapse_storage_segments(&with_attrs)
    }
}

/// Fold duplicated `/storage/uploads/storage/uploads/` segments down to a
/// single `/storage/uploads/`.
fn collapse_storage_segments(text: &str) -> String {
    let mut text = text.to_string();
    while text.contains(DOUBLED_STORAGE_UPLOADS) {
        text = text.replace(DOUBLED_STORAGE_UPLOADS, "/storage/uploads/");
    }
    text
}

impl Transform for AssetPathRewrite {
    fn apply(&self, mut value: Value) -> Value {
        self.walk(&mut value);
        value
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn path_field_gains_storage_prefix() {
        let rewrite = AssetPathRewrite::new("https://cms.test", None);
        let out = rewrite.apply(json!({"img": {"path": "/up/a.jpg"}}));
        assert_eq!(
            out,
            json!({"img": {"path": "https://cms.test/storage/uploads/up/a.jpg"}})
        );
    }

    #[test]
    fn tenant_scopes_the_path_prefix() {
        let rewrite = AssetPathRewrite::new("https://cms.test", Some("site-a"));
        let out = rewrite.apply(json!({"path": "/up/a.jpg"}));
        assert_eq!(
            out,
            json!({"path": "https://cms.test/:site-a/storage/uploads/up/a.jpg"})
        );
    }

    #[test]
    fn already_absolute_storage_path_is_not_doubled() {
        let rewrite = AssetPathRewrite::new("https://cms.test", None);
        let once = rewrite.apply(json!({"path": "/storage/uploads/a.jpg"}));
        assert_eq!(
            once,
            json!({"path": "https://cms.test/storage/uploads/a.jpg"})
        );
    }

    #[test]
    fn relative_path_without_leading_slash_is_untouched() {
        let rewrite = AssetPathRewrite::new("https://cms.test", None);
        let out = rewrite.apply(json!({"path": "up/a.jpg"}));
        assert_eq!(out, json!({"path": "up/a.jpg"}));
    }

    #[test]
    fn src_and_href_attributes_gain_base_url() {
        let rewrite = AssetPathRewrite::new("https://cms.test", None);
        let out = rewrite.apply(json!({
            "body": r#"<img src="/storage/uploads/a.png"> <a href="/storage/files/b.pdf">b</a>"#
        }));
        assert_eq!(
            out,
            json!({
                "body": r#"<img src="https://cms.test/storage/uploads/a.png"> <a href="https://cms.test/storage/files/b.pdf">b</a>"#
            })
        );
    }

    #[test]
    fn attribute_without_storage_is_untouched() {
        let rewrite = AssetPathRewrite::new("https://cms.test", None);
        let body = r#"<a href="/about">about</a>"#;
        let out = rewrite.apply(json!({ "body": body }));
        assert_eq!(out, json!({ "body": body }));
    }

    #[test]
    fn attribute_with_tenant_segment_keeps_it() {
        let rewrite = AssetPathRewrite::new("https://cms.test", None);
        let out = rewrite.apply(json!({
            "body": r#"<img src="/:site-a/storage/uploads/a.png">"#
        }));
        assert_eq!(
            out,
            json!({"body": r#"<img src="https://cms.test/:site-a/storage/uploads/a.png">"#})
        );
    }

    #[test]
    fn collapse_handles_repeated_segments() {
        assert_eq!(
            collapse_storage_segments("/storage/uploads/storage/uploads/a.jpg"),
            "/storage/uploads/a.jpg"
        );
        assert_eq!(
            collapse_storage_segments("/storage/uploads/storage/uploads/storage/uploads/a.jpg"),
            "/storage/uploads/a.jpg"
        );
        assert_eq!(collapse_storage_segments("/storage/uploads/a.jpg"), "/storage/uploads/a.jpg");
    }

    #[test]
    fn nested_arrays_are_walked() {
        let rewrite = AssetPathRewrite::new("https://cms.test", None);
        let out = rewrite.apply(json!({
            "gallery": [{"path": "/g/1.jpg"}, {"path": "/g/2.jpg"}]
        }));
        assert_eq!(
            out,
            json!({
                "gallery": [
                    {"path": "https://cms.test/storage/uploads/g/1.jpg"},
                    {"path": "https://cms.test/storage/uploads/g/2.jpg"}
                ]
            })
        );
    }
}
