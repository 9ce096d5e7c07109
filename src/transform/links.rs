//! Symbolic link substitution.
//!
//! Replaces `pages://<id>` occurrences inside string leaves with the
//! public route from a [`RouteMap`]. All keys are compiled into a single
//! alternation pattern, longest key first so no key shadows a longer one
//! that shares its prefix. A key mapped to an absent route leaves the
//! matched text unchanged.

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::warn;

use super::Transform;
use crate::routes::RouteMap;

/// Rewrites symbolic page links to their resolved routes.
pub struct LinkRewrite {
    replacements: RouteMap,
    pattern: Option<Regex>,
}

impl LinkRewrite {
    pub fn new(replacements: RouteMap) -> Self {
        let pattern = compile_pattern(&replacements);
        Self {
            replacements,
            pattern,
        }
    }

    fn walk(&self, value: &mut Value, pattern: &Regex) {
        match value {
            Value::Object(map) => {
                for (_, child) in map.iter_mut() {
                    self.walk(child, pattern);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.walk(item, pattern);
                }
            }
            Value::String(text) => {
                let rewritten = pattern.replace_all(text, |caps: &Captures| {
                    let matched = &caps[0];
                    match self.replacements.get(matched) {
                        Some(Some(route)) => route.clone(),
                        // Absent route: keep the symbolic link as-is.
                        _ => matched.to_string(),
                    }
                });
                if rewritten != *text {
                    *text = rewritten.into_owned();
                }
            }
            _ => {}
        }
    }
}

fn compile_pattern(replacements: &RouteMap) -> Option<Regex> {
    if replacements.is_empty() {
        return None;
    }
    let mut keys: Vec<&String> = replacements.keys().collect();
    keys.sort_by_key(|key| std::cmp::Reverse(key.len()));
    let alternation = keys
        .iter()
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&alternation) {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            warn!(error = %err, "Failed to compile link replacement pattern; links left unresolved");
            None
        }
    }
}

impl Transform for LinkRewrite {
    fn apply(&self, mut value: Value) -> Value {
        if let Some(pattern) = &self.pattern {
            self.walk(&mut value, pattern);
        }
        value
    }
}
