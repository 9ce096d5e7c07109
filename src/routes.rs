//! Route map derivation.
//!
//! Two lookup tables are derived from the pages collection and cached per
//! (endpoint, tenant): [`id_route_map`] maps `pages://<id>` symbolic keys
//! to public routes for link rewriting, and [`slug_route_map`] maps
//! collection/singleton names to routes for slug-based lookups.
//!
//! Both generators are best-effort enrichment: a transport failure or a
//! non-2xx status degrades to an empty map with a warning instead of
//! failing the caller's primary request. Cache backend failures do
//! propagate — a broken store is a configuration error.
//!
//! Concurrent invocations for the same (endpoint, tenant) key are not
//! serialized: two callers racing past a cache miss both fetch and both
//! write. The snapshots are equivalent, so last write wins and the race is
//! benign.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::cache::CacheManager;
use crate::error::ClientError;
use crate::http::Fetch;

/// Symbolic key (`pages://<id>`) to route. An absent route is retained so
/// the rewriter can leave the symbolic link untouched on lookup.
pub type RouteMap = BTreeMap<String, Option<String>>;

/// Collection or singleton name to route.
pub type SlugRouteMap = BTreeMap<String, String>;

pub const ID_ROUTE_MAP_KEY_PREFIX: &str = "ROUTE_REPLACEMENT_MAP:";
pub const SLUG_ROUTE_MAP_KEY_PREFIX: &str = "SLUG_ROUTE_MAP:";

const PAGES_SCHEME_PREFIX: &str = "pages://";
const PAGES_LIST_PATH: &str = "/api/pages/pages";

#[derive(Debug, Deserialize)]
struct PageRouteRecord {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_r")]
    route: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageSlugRecord {
    #[serde(rename = "_r")]
    route: Option<String>,
    #[serde(default)]
    data: Option<PageEntityData>,
}

#[derive(Debug, Deserialize)]
struct PageEntityData {
    #[serde(default)]
    collection: Option<String>,
    #[serde(default)]
    singleton: Option<String>,
}

/// Derive the `pages://<id>` to route table, cache-first.
pub async fn id_route_map(
    fetch: &dyn Fetch,
    origin: &str,
    tenant: Option<&str>,
    cache: Option<&CacheManager>,
) -> Result<RouteMap, ClientError> {
    let cache_key = tenant_cache_key(ID_ROUTE_MAP_KEY_PREFIX, tenant);
    if let Some(cached) = read_cached_map::<RouteMap>(cache, &cache_key).await? {
        return Ok(cached);
    }

    let query = [(
        "fields",
        json!({"_id": 1, "_r": 1, "slug": 1}).to_string(),
    )];
    // A degraded fetch yields an empty map but is never cached, so a
    // recovered upstream is picked up on the next call.
    let Some(records) =
        fetch_page_records::<PageRouteRecord>(fetch, origin, tenant, &query).await
    else {
        return Ok(RouteMap::new());
    };
    let map: RouteMap = records
        .into_iter()
        .map(|record| (format!("{PAGES_SCHEME_PREFIX}{}", record.id), record.route))
        .collect();

    write_cached_map(cache, &cache_key, &map).await?;
    Ok(map)
}

/// Derive the collection/singleton name to route table, cache-first.
pub async fn slug_route_map(
    fetch: &dyn Fetch,
    origin: &str,
    tenant: Option<&str>,
    cache: Option<&CacheManager>,
) -> Result<SlugRouteMap, ClientError> {
    let cache_key = tenant_cache_key(SLUG_ROUTE_MAP_KEY_PREFIX, tenant);
    if let Some(cached) = read_cached_map::<SlugRouteMap>(cache, &cache_key).await? {
        return Ok(cached);
    }

    let query = [
        (
            "filter",
            json!({"data.collection": {"$ne": null}}).to_string(),
        ),
        (
            "fields",
            json!({"_r": 1, "data.collection": 1, "data.singleton": 1}).to_string(),
        ),
    ];
    let Some(records) =
        fetch_page_records::<PageSlugRecord>(fetch, origin, tenant, &query).await
    else {
        return Ok(SlugRouteMap::new());
    };
    let map: SlugRouteMap = records
        .into_iter()
        .filter_map(|record| {
            let data = record.data?;
            // Collection takes priority when both are present.
            let name = data.collection.or(data.singleton)?;
            Some((name, record.route?))
        })
        .collect();

    write_cached_map(cache, &cache_key, &map).await?;
    Ok(map)
}

fn tenant_cache_key(prefix: &str, tenant: Option<&str>) -> String {
    format!("{prefix}{}", tenant.unwrap_or("default"))
}

async fn read_cached_map<M>(
    cache: Option<&CacheManager>,
    key: &str,
) -> Result<Option<M>, ClientError>
where
    M: serde::de::DeserializeOwned,
{
    let Some(cache) = cache else {
        return Ok(None);
    };
    let Some(value) = cache.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(map) => Ok(Some(map)),
        Err(err) => {
            warn!(key, error = %err, "Cached route map does not decode; refetching");
            Ok(None)
        }
    }
}

async fn write_cached_map<M>(
    cache: Option<&CacheManager>,
    key: &str,
    map: &M,
) -> Result<(), ClientError>
where
    M: serde::Serialize,
{
    if let Some(cache) = cache {
        cache.set(key, serde_json::to_value(map)?).await?;
    }
    Ok(())
}

/// Issue the one list-pages request and parse its records. `None` covers
/// every degraded outcome: bad origin, transport failure, non-2xx, and a
/// non-array body. Records that do not parse are skipped.
async fn fetch_page_records<R>(
    fetch: &dyn Fetch,
    origin: &str,
    tenant: Option<&str>,
    query: &[(&str, String)],
) -> Option<Vec<R>>
where
    R: serde::de::DeserializeOwned,
{
    let tenant_segment = tenant.map(|t| format!("/:{t}")).unwrap_or_default();
    let raw_url = format!(
        "{}{tenant_segment}{PAGES_LIST_PATH}",
        origin.trim_end_matches('/')
    );
    let mut url = match Url::parse(&raw_url) {
        Ok(url) => url,
        Err(err) => {
            warn!(url = raw_url, error = %err, "Invalid pages endpoint URL; using empty route map");
            return None;
        }
    };
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name, value);
        }
    }

    let response = match fetch.get_json(url).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "Pages list request failed; using empty route map");
            return None;
        }
    };
    if !response.is_success() {
        warn!(
            status = response.status,
            "Pages list request returned an error status; using empty route map"
        );
        return None;
    }

    let Value::Array(items) = response.body else {
        debug!("Pages list body is not an array; treating as no pages");
        return Some(Vec::new());
    };
    let records = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(error = %err, "Skipping malformed page record");
                None
            }
        })
        .collect();
    Some(records)
}
