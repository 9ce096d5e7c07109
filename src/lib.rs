//! Typed asynchronous client for the Cockpit headless CMS API.
//!
//! The crate is built around three pieces:
//!
//! - **Route resolution**: [`routes`] derives flat lookup tables from the
//!   pages collection — `pages://<id>` symbolic links to public routes, and
//!   collection/singleton names to routes — caching them per
//!   (endpoint, tenant) through [`cache::CacheManager`].
//! - **Response rewriting**: [`transform`] walks raw API payloads and fixes
//!   storage-relative asset paths, rewrites embedded `src`/`href`
//!   attributes, and resolves `pages://` links against a route table.
//! - **Pluggable caching**: [`cache`] defines the async store contract with
//!   a bounded in-memory default and a no-op variant for disabled caching;
//!   any conforming remote store can be substituted.
//!
//! [`client::CockpitClient`] wires the pieces together for the common case:
//!
//! ```no_run
//! use cockpit_client::client::CockpitClient;
//! use cockpit_client::config::ClientConfig;
//!
//! # async fn demo() -> Result<(), cockpit_client::error::ClientError> {
//! let client = CockpitClient::new(
//!     ClientConfig::new("https://cms.example.com").with_tenant("site-a"),
//! )?;
//! let routes = client.id_route_map().await?;
//! # let _ = routes;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod routes;
pub mod transform;

pub use client::CockpitClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use protocol::{LinkProtocol, ParsedLink, parse_cockpit_url};
pub use routes::{RouteMap, SlugRouteMap};
pub use transform::ResponseTransformer;
