//! Crate-level error type.
//!
//! Failure handling is deliberately asymmetric. Transport failures during
//! route-map generation and serialization failures during response
//! rewriting degrade locally (empty map, original value) and never surface
//! here. A misbehaving cache backend, by contrast, is a configuration
//! problem the caller must see, so store failures propagate unobscured.

use thiserror::Error;

use crate::cache::store::StoreError;
use crate::config::ConfigError;
use crate::http::FetchError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Cache(#[from] StoreError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}
