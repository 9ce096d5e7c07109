//! Client facade.
//!
//! [`CockpitClient`] wires configuration, transport, and caching together:
//! route maps are derived lazily and cached per (endpoint, tenant), and
//! response payloads are rewritten through a transformer built from the
//! current id route map. Both the transport and the cache store are
//! injectable for tests and for remote cache backends.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheManager, CacheStore, MemoryStore};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{Fetch, HttpFetch};
use crate::routes::{
    self, ID_ROUTE_MAP_KEY_PREFIX, RouteMap, SLUG_ROUTE_MAP_KEY_PREFIX, SlugRouteMap,
};
use crate::transform::ResponseTransformer;

#[derive(Clone)]
pub struct CockpitClient {
    config: ClientConfig,
    fetch: Arc<dyn Fetch>,
    cache: CacheManager,
}

impl CockpitClient {
    /// Build a client with the default transport and, depending on
    /// `config.cache.enabled`, a bounded in-memory store or a no-op store.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let fetch = Arc::new(HttpFetch::new(config.api_token.clone())?);
        Ok(Self::with_parts(config, fetch, None))
    }

    /// Build a client with an injected transport and/or cache store.
    /// `store: None` falls back to the configured default.
    pub fn with_parts(
        config: ClientConfig,
        fetch: Arc<dyn Fetch>,
        store: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        let tenant = config.tenant.as_deref();
        let cache = match store {
            Some(store) => CacheManager::new(store, &config.base_url, tenant),
            None if config.cache.enabled => CacheManager::new(
                Arc::new(MemoryStore::with_limits(
                    config.cache.entry_limit,
                    std::time::Duration::from_millis(config.cache.ttl_ms),
                )),
                &config.base_url,
                tenant,
            ),
            None => CacheManager::disabled(&config.base_url, tenant),
        };
        Self {
            config,
            fetch,
            cache,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The `pages://<id>` to route table for this endpoint and tenant.
    pub async fn id_route_map(&self) -> Result<RouteMap, ClientError> {
        routes::id_route_map(
            self.fetch.as_ref(),
            &self.config.base_url,
            self.config.tenant.as_deref(),
            Some(&self.cache),
        )
        .await
    }

    /// The collection/singleton name to route table.
    pub async fn slug_route_map(&self) -> Result<SlugRouteMap, ClientError> {
        routes::slug_route_map(
            self.fetch.as_ref(),
            &self.config.base_url,
            self.config.tenant.as_deref(),
            Some(&self.cache),
        )
        .await
    }

    /// Resolve one collection or singleton name to its route.
    pub async fn route_for_slug(&self, name: &str) -> Result<Option<String>, ClientError> {
        Ok(self.slug_route_map().await?.get(name).cloned())
    }

    /// Build a transformer over the current id route map.
    pub async fn transformer(&self) -> Result<ResponseTransformer, ClientError> {
        let replacements = self.id_route_map().await?;
        Ok(ResponseTransformer::new(
            &self.config.base_url,
            self.config.tenant.as_deref(),
            replacements,
        ))
    }

    /// Rewrite one response payload: fix asset paths and resolve symbolic
    /// links. Malformed payloads come back unmodified.
    pub async fn transform<T>(&self, value: T) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        Ok(self.transformer().await?.transform(value))
    }

    /// Drop both cached route map families for this endpoint and tenant.
    /// The next access recomputes them from the API.
    pub async fn invalidate_route_maps(&self) -> Result<(), ClientError> {
        self.cache.clear(Some(ID_ROUTE_MAP_KEY_PREFIX)).await?;
        self.cache.clear(Some(SLUG_ROUTE_MAP_KEY_PREFIX)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use url::Url;

    use super::*;
    use crate::http::{FetchError, FetchResponse};

    struct SequenceFetch {
        bodies: std::sync::Mutex<Vec<Value>>,
    }

    impl SequenceFetch {
        fn new(bodies: Vec<Value>) -> Self {
            Self {
                bodies: std::sync::Mutex::new(bodies),
            }
        }
    }

    #[async_trait]
    impl Fetch for SequenceFetch {
        async fn get_json(&self, _url: Url) -> Result<FetchResponse, FetchError> {
            let mut bodies = self.bodies.lock().expect("bodies lock");
            let body = if bodies.is_empty() {
                json!([])
            } else {
                bodies.remove(0)
            };
            Ok(FetchResponse { status: 200, body })
        }
    }

    fn client(bodies: Vec<Value>) -> CockpitClient {
        CockpitClient::with_parts(
            ClientConfig::new("https://cms.test"),
            Arc::new(SequenceFetch::new(bodies)),
            None,
        )
    }

    #[tokio::test]
    async fn transform_resolves_links_and_paths() -> Result<(), ClientError> {
        let client = client(vec![json!([{"_id": "p1", "_r": "/about"}])]);

        let out = client
            .transform(json!({
                "link": "pages://p1",
                "img": {"path": "/up/a.jpg"},
            }))
            .await?;

        assert_eq!(
            out,
            json!({
                "link": "/about",
                "img": {"path": "https://cms.test/storage/uploads/up/a.jpg"},
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn route_for_slug_resolves_collections() -> Result<(), ClientError> {
        let client = client(vec![json!([
            {"_r": "/news", "data": {"collection": "articles"}}
        ])]);

        assert_eq!(
            client.route_for_slug("articles").await?,
            Some("/news".to_string())
        );
        assert_eq!(client.route_for_slug("missing").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() -> Result<(), ClientError> {
        let client = client(vec![
            json!([{"_id": "p1", "_r": "/old"}]),
            json!([{"_id": "p1", "_r": "/new"}]),
        ]);

        let first = client.id_route_map().await?;
        assert_eq!(first["pages://p1"], Some("/old".to_string()));

        // Cached: the second body is not consumed yet.
        let again = client.id_route_map().await?;
        assert_eq!(again, first);

        client.invalidate_route_maps().await?;

        let refreshed = client.id_route_map().await?;
        assert_eq!(refreshed["pages://p1"], Some("/new".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn disabled_cache_fetches_every_time() -> Result<(), ClientError> {
        let mut config = ClientConfig::new("https://cms.test");
        config.cache.enabled = false;
        let client = CockpitClient::with_parts(
            config,
            Arc::new(SequenceFetch::new(vec![
                json!([{"_id": "p1", "_r": "/one"}]),
                json!([{"_id": "p1", "_r": "/two"}]),
            ])),
            None,
        );

        let first = client.id_route_map().await?;
        let second = client.id_route_map().await?;
        assert_eq!(first["pages://p1"], Some("/one".to_string()));
        assert_eq!(second["pages://p1"], Some("/two".to_string()));
        Ok(())
    }
}
