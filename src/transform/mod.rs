//! Response rewriting.
//!
//! Raw API payloads come back with storage-relative asset paths and
//! unresolved `pages://` links. The transformers here fix both by walking
//! the parsed JSON tree and rewriting string leaves, instead of regexing
//! the serialized buffer: same observable results, no risk of touching a
//! non-string token.
//!
//! [`AssetPathRewrite`] and [`LinkRewrite`] are independently usable and
//! chain through [`Pipeline`]; [`ResponseTransformer`] is the combined
//! unit the client applies to every response, with a generic entry point
//! that falls back to the untouched input when (de)serialization fails.

pub mod assets;
pub mod links;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

pub use assets::AssetPathRewrite;
pub use links::LinkRewrite;

use crate::routes::RouteMap;

/// One rewriting pass over a parsed payload.
pub trait Transform: Send + Sync {
    fn apply(&self, value: Value) -> Value;
}

/// Applies transformers left to right, feeding each one's output into the
/// next. Empty pipeline is the identity.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, step: impl Transform + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }
}

impl Transform for Pipeline {
    fn apply(&self, value: Value) -> Value {
        self.steps
            .iter()
            .fold(value, |value, step| step.apply(value))
    }
}

/// Combined asset-path and link rewriting over one parsed tree.
///
/// Asset paths are fixed before links are substituted, so the duplicate
/// `/storage/uploads` collapse sees the final form of every string.
pub struct ResponseTransformer {
    assets: AssetPathRewrite,
    links: LinkRewrite,
}

impl ResponseTransformer {
    pub fn new(base_url: &str, tenant: Option<&str>, replacements: RouteMap) -> Self {
        Self {
            assets: AssetPathRewrite::new(base_url, tenant),
            links: LinkRewrite::new(replacements),
        }
    }

    /// Rewrite a typed payload. Serialization or deserialization failure
    /// logs a warning and returns the original value unmodified; callers
    /// never see an error from malformed data.
    pub fn transform<T>(&self, value: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        let raw = match serde_json::to_value(&value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "Response is not JSON-serializable; returning it untransformed");
                return value;
            }
        };
        match serde_json::from_value(self.apply(raw)) {
            Ok(rewritten) => rewritten,
            Err(err) => {
                warn!(error = %err, "Rewritten response does not decode; returning the original");
                value
            }
        }
    }
}

impl Transform for ResponseTransformer {
    fn apply(&self, value: Value) -> Value {
        self.links.apply(self.assets.apply(value))
    }
}
