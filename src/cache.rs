use crate::errors::Result;
use crate::metrics;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key of the ETag entry inside the airdrop hash namespace
pub const ETAG_CACHE_KEY: &str = "ETAG";

/// Typed key of the unique-value cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Last successfully parsed index JSON
    AirdropsMetadata,
    /// ETag the cached index was fetched with
    AirdropsEtag,
    /// Index hash of a downloaded payload file, keyed by filename
    AirdropsHash(String),
}

impl CacheKey {
    const METADATA_TAG: &'static str = "AIRDROPS_METADATA";
    const HASH_TAG: &'static str = "AIRDROPS_HASH";

    /// Flat key used by persistent stores. The ETag lives in the hash namespace.
    pub fn storage_key(&self) -> String {
        match self {
            CacheKey::AirdropsMetadata => Self::METADATA_TAG.to_string(),
            CacheKey::AirdropsEtag => format!("{}{}", Self::HASH_TAG, ETAG_CACHE_KEY),
            CacheKey::AirdropsHash(filename) => format!("{}{}", Self::HASH_TAG, filename),
        }
    }

    /// Prefix shared by every payload hash and the ETag
    pub fn hash_prefix() -> &'static str {
        Self::HASH_TAG
    }

    fn label(&self) -> &'static str {
        match self {
            CacheKey::AirdropsMetadata => "airdrops_metadata",
            CacheKey::AirdropsEtag => "airdrops_etag",
            CacheKey::AirdropsHash(_) => "airdrops_hash",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    Set(CacheKey, String),
    Delete(CacheKey),
}

/// Durable key-value store for the synchronization pipeline.
///
/// `apply` must be atomic: readers observe either none or all of a batch.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>>;

    /// Reads several keys from one consistent snapshot.
    async fn get_many(&self, keys: &[CacheKey]) -> Result<Vec<Option<String>>>;

    async fn apply(&self, ops: Vec<CacheOp>) -> Result<()>;

    /// Number of entries in the hash namespace (payload hashes plus the ETag)
    async fn count_hashes(&self) -> Result<usize>;

    async fn set(&self, key: CacheKey, value: String) -> Result<()> {
        self.apply(vec![CacheOp::Set(key, value)]).await
    }
}

/// Process-local [`CacheStore`]. One lock guards the whole map.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<CacheKey, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let value = self.entries.read().await.get(key).cloned();
        match value {
            Some(_) => metrics::increment_cache_hit(key.label()),
            None => metrics::increment_cache_miss(key.label()),
        }
        Ok(value)
    }

    async fn get_many(&self, keys: &[CacheKey]) -> Result<Vec<Option<String>>> {
        let entries = self.entries.read().await;
        Ok(keys.iter().map(|k| entries.get(k).cloned()).collect())
    }

    async fn apply(&self, ops: Vec<CacheOp>) -> Result<()> {
        let mut entries = self.entries.write().await;
        for op in ops {
            match op {
                CacheOp::Set(key, value) => {
                    entries.insert(key, value);
                }
                CacheOp::Delete(key) => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn count_hashes(&self) -> Result<usize> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| matches!(k, CacheKey::AirdropsEtag | CacheKey::AirdropsHash(_)))
            .count())
    }
}

/// Cached index blob and the ETag it was fetched with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMetadata {
    pub json: String,
    pub etag: Option<String>,
}

/// Reads the cached index JSON and its ETag.
pub async fn get_cached_metadata(store: &dyn CacheStore) -> Result<Option<CachedMetadata>> {
    let mut values = store
        .get_many(&[CacheKey::AirdropsMetadata, CacheKey::AirdropsEtag])
        .await?
        .into_iter();
    let json = values.next().flatten();
    let etag = values.next().flatten();
    match json {
        Some(json) => {
            metrics::increment_cache_hit("airdrops_metadata");
            Ok(Some(CachedMetadata { json, etag }))
        }
        None => {
            metrics::increment_cache_miss("airdrops_metadata");
            Ok(None)
        }
    }
}

/// Stores the index JSON together with its ETag in one batch.
///
/// A missing ETag removes the stored one so a stale ETag never pairs with new JSON.
pub async fn set_cached_metadata(
    store: &dyn CacheStore,
    json: String,
    etag: Option<String>,
) -> Result<()> {
    let etag_op = match etag {
        Some(etag) => CacheOp::Set(CacheKey::AirdropsEtag, etag),
        None => CacheOp::Delete(CacheKey::AirdropsEtag),
    };
    store
        .apply(vec![CacheOp::Set(CacheKey::AirdropsMetadata, json), etag_op])
        .await?;
    debug!("Stored airdrops metadata in cache");
    Ok(())
}
