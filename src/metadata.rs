//! Remote index synchronization.
//!
//! The index is fetched with a conditional GET driven by the cached ETag. The
//! cached JSON and ETag are only ever written together, so a later `304 Not
//! Modified` always refers to the JSON we hold.

use crate::assets::AssetCatalog;
use crate::cache::{self, CacheStore};
use crate::errors::{AirdropError, Result};
use crate::http_client::HttpFetcher;
use crate::messages::MessagesAggregator;
use crate::metrics;
use crate::parser::{parse_airdrops, parse_poap_airdrops};
use crate::settings::AirdropSettings;
use crate::types::AirdropsMetadata;
use log::{debug, info};
use serde_json::{Map, Value};

const AIRDROPS_KEY: &str = "airdrops";
const POAP_AIRDROPS_KEY: &str = "poap_airdrops";

/// Parses and shape-checks an index document. Entry order is preserved.
pub fn parse_index_json(text: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(index) = value else {
        return Err(AirdropError::malformed("index", "document is not a JSON object"));
    };
    for key in [AIRDROPS_KEY, POAP_AIRDROPS_KEY] {
        if !matches!(index.get(key), Some(Value::Object(_))) {
            return Err(AirdropError::malformed(
                "index",
                format!("missing `{}` object", key),
            ));
        }
    }
    Ok(index)
}

/// Builds typed records out of a shape-checked index.
pub fn parse_metadata(
    catalog: &dyn AssetCatalog,
    messages: &MessagesAggregator,
    index: &Map<String, Value>,
) -> AirdropsMetadata {
    AirdropsMetadata {
        airdrops: section(index, AIRDROPS_KEY)
            .map(|raw| parse_airdrops(catalog, messages, raw))
            .unwrap_or_default(),
        poap_airdrops: section(index, POAP_AIRDROPS_KEY)
            .map(|raw| parse_poap_airdrops(messages, raw))
            .unwrap_or_default(),
    }
}

fn section<'a>(index: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    index.get(key).and_then(Value::as_object)
}

/// Fetches the airdrops index, reusing the cached copy when the remote ETag
/// is unchanged.
///
/// A fresh index replaces the cached JSON and ETag in a single batch.
/// Fails with [`AirdropError::Remote`] when the index cannot be retrieved.
pub async fn fetch_airdrops_metadata(
    settings: &AirdropSettings,
    http: &dyn HttpFetcher,
    store: &dyn CacheStore,
    catalog: &dyn AssetCatalog,
    messages: &MessagesAggregator,
) -> Result<AirdropsMetadata> {
    let index_url = settings.index_url();

    // An ETag is only worth sending if the JSON it belongs to still parses
    let cached = match cache::get_cached_metadata(store).await? {
        Some(cached) => match parse_index_json(&cached.json) {
            Ok(index) => Some((cached.etag, index)),
            Err(e) => {
                debug!("Ignoring unusable cached airdrops index: {}", e);
                None
            }
        },
        None => None,
    };
    let etag = cached.as_ref().and_then(|(etag, _)| etag.as_deref());

    let response = http.get(&index_url, etag).await?;
    metrics::increment_remote_fetch("index");

    if response.is_not_modified() {
        return match cached {
            Some((_, index)) => {
                debug!("Airdrops index unchanged, using cached copy");
                metrics::increment_cache_hit("airdrops_index");
                Ok(parse_metadata(catalog, messages, &index))
            }
            None => Err(AirdropError::Remote(format!(
                "{} answered 304 but no cached index exists",
                index_url
            ))),
        };
    }

    if !response.is_success() {
        return Err(AirdropError::Remote(format!(
            "{} returned status {}",
            index_url, response.status
        )));
    }

    let index = parse_index_json(response.text()?)
        .map_err(|e| AirdropError::Remote(format!("invalid airdrops index: {}", e)))?;
    metrics::increment_cache_miss("airdrops_index");

    let json = serde_json::to_string(&index)?;
    cache::set_cached_metadata(store, json, response.etag.clone()).await?;
    info!(
        "Fetched airdrops index ({} entries)",
        index.get(AIRDROPS_KEY).and_then(Value::as_object).map_or(0, Map::len)
    );

    Ok(parse_metadata(catalog, messages, &index))
}

/// Parses the cached index without touching the network.
pub async fn load_cached_metadata(
    store: &dyn CacheStore,
    catalog: &dyn AssetCatalog,
    messages: &MessagesAggregator,
) -> Result<Option<AirdropsMetadata>> {
    let Some(cached) = cache::get_cached_metadata(store).await? else {
        return Ok(None);
    };
    match parse_index_json(&cached.json) {
        Ok(index) => Ok(Some(parse_metadata(catalog, messages, &index))),
        Err(e) => {
            debug!("Cached airdrops index is unusable: {}", e);
            Ok(None)
        }
    }
}
