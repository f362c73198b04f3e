use crate::cache::{CacheKey, CacheOp, CacheStore};
use crate::errors::{AirdropError, Result as AirdropResult};
use crate::history::{HistoryEvent, HistoryEventSubType, HistoryEventType, HistoryEventsStore};
use crate::settings::DatabaseSettings;
use anyhow::Result;
use async_trait::async_trait;
use ethers::types::Address;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres, Row};
use std::str::FromStr;
use std::time::Duration;

/// PostgreSQL connection pool type alias.
pub type DbPool = Pool<Postgres>;

/// Connects with retries and creates the schema if needed.
pub async fn connect(settings: &DatabaseSettings) -> Result<DbPool> {
    let database_url = settings
        .url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("database.url / DATABASE_URL must be set"))?;

    let mut last_err: Option<anyhow::Error> = None;
    let max_attempts: u32 = 5;
    for attempt in 1..=max_attempts {
        match PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                log::info!(
                    "Connected to database (attempt {}/{})",
                    attempt,
                    max_attempts
                );
                match initialize_database(&pool, &settings.schema).await {
                    Ok(()) => return Ok(pool),
                    Err(e) => last_err = Some(e),
                }
            }
            Err(e) => {
                last_err = Some(e.into());
            }
        }
        let delay_ms = (1u64 << attempt.min(6)) * 200;
        log::warn!(
            "DB connect/init attempt {}/{} failed. Retrying in {} ms...",
            attempt,
            max_attempts,
            delay_ms
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Unknown DB connection error")))
}

pub async fn initialize_database(pool: &DbPool, schema: &str) -> Result<()> {
    const MIGRATION_LOCK_ID: i64 = 0x41495244524F5053; // "AIRDROPS" in hex

    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&mut *tx)
        .await?;

    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(&mut *tx)
        .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {}.unique_cache (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            last_queried_ts BIGINT NOT NULL DEFAULT EXTRACT(EPOCH FROM NOW())
        )",
        schema
    ))
    .execute(&mut *tx)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {}.history_events (
            id SERIAL PRIMARY KEY,
            event_identifier TEXT NOT NULL,
            sequence_index INTEGER NOT NULL,
            timestamp_ms BIGINT NOT NULL,
            location_label VARCHAR(42) NOT NULL,
            event_type TEXT NOT NULL,
            event_subtype TEXT NOT NULL,
            asset TEXT NOT NULL,
            amount TEXT NOT NULL,
            UNIQUE(event_identifier, sequence_index)
        )",
        schema
    ))
    .execute(&mut *tx)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_history_events_label_asset ON {}.history_events(location_label, asset)",
        schema
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    log::info!("Database schema {} ready", schema);
    Ok(())
}

fn store_error(e: impl std::fmt::Display) -> AirdropError {
    AirdropError::Cache(e.to_string())
}

/// [`CacheStore`] backed by the `unique_cache` table.
#[derive(Debug, Clone)]
pub struct PgCacheStore {
    pool: DbPool,
    schema: String,
}

impl PgCacheStore {
    pub fn new(pool: DbPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn get(&self, key: &CacheKey) -> AirdropResult<Option<String>> {
        let row = sqlx::query(&format!(
            "SELECT value FROM {}.unique_cache WHERE key = $1",
            self.schema
        ))
        .bind(key.storage_key())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match row {
            Some(row) => Ok(Some(row.try_get("value").map_err(store_error)?)),
            None => Ok(None),
        }
    }

    async fn get_many(&self, keys: &[CacheKey]) -> AirdropResult<Vec<Option<String>>> {
        let storage_keys: Vec<String> = keys.iter().map(CacheKey::storage_key).collect();
        let rows = sqlx::query(&format!(
            "SELECT key, value FROM {}.unique_cache WHERE key = ANY($1)",
            self.schema
        ))
        .bind(&storage_keys)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let mut values = vec![None; keys.len()];
        for row in rows {
            let key: String = row.try_get("key").map_err(store_error)?;
            let value: String = row.try_get("value").map_err(store_error)?;
            if let Some(idx) = storage_keys.iter().position(|k| *k == key) {
                values[idx] = Some(value);
            }
        }
        Ok(values)
    }

    async fn apply(&self, ops: Vec<CacheOp>) -> AirdropResult<()> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        for op in ops {
            match op {
                CacheOp::Set(key, value) => {
                    sqlx::query(&format!(
                        "INSERT INTO {}.unique_cache (key, value) VALUES ($1, $2)
                         ON CONFLICT (key) DO UPDATE SET
                         value = EXCLUDED.value,
                         last_queried_ts = EXTRACT(EPOCH FROM NOW())",
                        self.schema
                    ))
                    .bind(key.storage_key())
                    .bind(value)
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;
                }
                CacheOp::Delete(key) => {
                    sqlx::query(&format!(
                        "DELETE FROM {}.unique_cache WHERE key = $1",
                        self.schema
                    ))
                    .bind(key.storage_key())
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;
                }
            }
        }
        tx.commit().await.map_err(store_error)?;
        Ok(())
    }

    async fn count_hashes(&self) -> AirdropResult<usize> {
        let row = sqlx::query(&format!(
            "SELECT COUNT(*) AS n FROM {}.unique_cache WHERE key LIKE $1",
            self.schema
        ))
        .bind(format!("{}%", CacheKey::hash_prefix()))
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        let n: i64 = row.try_get("n").map_err(store_error)?;
        Ok(n as usize)
    }
}

/// [`HistoryEventsStore`] backed by the `history_events` table.
#[derive(Debug, Clone)]
pub struct PgHistoryEvents {
    pool: DbPool,
    schema: String,
}

impl PgHistoryEvents {
    pub fn new(pool: DbPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    pub async fn add_history_events(&self, events: &[HistoryEvent]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for event in events {
            sqlx::query(&format!(
                "INSERT INTO {}.history_events
                 (event_identifier, sequence_index, timestamp_ms, location_label, event_type, event_subtype, asset, amount)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (event_identifier, sequence_index) DO NOTHING",
                self.schema
            ))
            .bind(&event.event_identifier)
            .bind(event.sequence_index as i32)
            .bind(event.timestamp_ms)
            .bind(format!("{:?}", event.location_label))
            .bind(event.event_type.as_str())
            .bind(event.event_subtype.as_str())
            .bind(&event.asset)
            .bind(event.amount.to_string())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryEventsStore for PgHistoryEvents {
    async fn query_events(
        &self,
        address: Address,
        asset: &str,
        event_type: HistoryEventType,
        event_subtype: HistoryEventSubType,
    ) -> AirdropResult<Vec<HistoryEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT event_identifier, sequence_index, timestamp_ms, amount
             FROM {}.history_events
             WHERE location_label = $1 AND asset = $2 AND event_type = $3 AND event_subtype = $4
             ORDER BY timestamp_ms",
            self.schema
        ))
        .bind(format!("{:?}", address))
        .bind(asset)
        .bind(event_type.as_str())
        .bind(event_subtype.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let amount: String = row.try_get("amount").map_err(store_error)?;
            events.push(HistoryEvent {
                event_identifier: row.try_get("event_identifier").map_err(store_error)?,
                sequence_index: row.try_get::<i32, _>("sequence_index").map_err(store_error)? as u32,
                timestamp_ms: row.try_get("timestamp_ms").map_err(store_error)?,
                location_label: address,
                event_type,
                event_subtype,
                asset: asset.to_string(),
                amount: Decimal::from_str(&amount).map_err(store_error)?,
            });
        }
        Ok(events)
    }
}
