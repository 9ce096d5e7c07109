//! Transport seam.
//!
//! The route generator only needs one capability: perform an HTTP GET and
//! get back a status plus the body as JSON (or raw text when the body is
//! not JSON). [`Fetch`] captures that, and [`HttpFetch`] is the default
//! `reqwest`-backed implementation. Retry, backoff, and timeouts belong to
//! whatever implements the trait, not to this crate.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Status and decoded body of one round trip.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Parsed JSON body, or `Value::String` with the raw text when the
    /// body is not valid JSON.
    pub body: Value,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP GET, supplied externally.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get_json(&self, url: Url) -> Result<FetchResponse, FetchError>;
}

/// Default transport: `reqwest` with an optional static bearer token.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: Client,
    token: Option<String>,
}

impl HttpFetch {
    pub fn new(token: Option<String>) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { client, token })
    }

    pub fn user_agent() -> &'static str {
        concat!("cockpit-client/", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn get_json(&self, url: Url) -> Result<FetchResponse, FetchError> {
        let mut req = self.client.get(url);
        if let Some(token) = &self.token {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Ok(FetchResponse { status, body })
    }
}
