//! Per-protocol payload download and local caching.
//!
//! A payload is re-downloaded only when its local file is missing or when the
//! hash published in the index differs from the one cached for the file. The
//! index hash is authoritative; the content hash we compute ourselves is only
//! logged.

use crate::cache::{CacheKey, CacheStore};
use crate::errors::{AirdropError, Result};
use crate::http_client::HttpFetcher;
use crate::messages::MessagesAggregator;
use crate::metrics;
use crate::parser::check_protocol_name;
use crate::settings::Settings;
use crate::types::conversions::{parse_amount, raw_to_token_amount, string_to_address, RAW_UNIT_DECIMALS};
use crate::types::{AirdropRecord, PoapRecord};
use crate::utils::sha256_hex;
use ethers::types::Address;
use indexmap::IndexMap;
use log::{debug, info};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    AirdropCsv,
    PoapJson,
}

impl PayloadKind {
    fn dir(&self, settings: &Settings) -> PathBuf {
        match self {
            PayloadKind::AirdropCsv => settings.airdrops_dir(),
            PayloadKind::PoapJson => settings.poap_airdrops_dir(),
        }
    }

    fn filename(&self, protocol: &str) -> String {
        match self {
            PayloadKind::AirdropCsv => AirdropRecord::filename(protocol),
            PayloadKind::PoapJson => PoapRecord::filename(protocol),
        }
    }

    fn validate(&self, protocol: &str, content: &str) -> Result<()> {
        match self {
            PayloadKind::AirdropCsv => validate_csv(protocol, content),
            PayloadKind::PoapJson => parse_poap_holders(protocol, content).map(|_| ()),
        }
    }
}

/// Returns the claim CSV of `protocol`, downloading it if the cached copy is stale.
pub async fn get_airdrop_data(
    settings: &Settings,
    http: &dyn HttpFetcher,
    store: &dyn CacheStore,
    protocol: &str,
    record: &AirdropRecord,
) -> Result<String> {
    fetch_payload(
        settings,
        http,
        store,
        PayloadKind::AirdropCsv,
        protocol,
        &record.csv_path,
        &record.csv_hash,
    )
    .await
}

/// Returns the POAP holders of `protocol` (address -> token ids).
pub async fn get_poap_airdrop_data(
    settings: &Settings,
    http: &dyn HttpFetcher,
    store: &dyn CacheStore,
    messages: &MessagesAggregator,
    protocol: &str,
    record: &PoapRecord,
) -> Result<IndexMap<Address, Vec<u64>>> {
    let content = fetch_payload(
        settings,
        http,
        store,
        PayloadKind::PoapJson,
        protocol,
        &record.json_path,
        &record.hash,
    )
    .await?;

    let raw = parse_poap_holders(protocol, &content)?;
    let mut holders = IndexMap::with_capacity(raw.len());
    for (address, assets) in raw {
        match string_to_address(&address) {
            Ok(address) => {
                holders.insert(address, assets);
            }
            Err(e) => messages.add_warning(format!(
                "Skipping POAP holder of {} because of an invalid address: {}",
                protocol, e
            )),
        }
    }
    Ok(holders)
}

async fn fetch_payload(
    settings: &Settings,
    http: &dyn HttpFetcher,
    store: &dyn CacheStore,
    kind: PayloadKind,
    protocol: &str,
    remote_path: &str,
    index_hash: &str,
) -> Result<String> {
    check_protocol_name(protocol).map_err(|reason| AirdropError::malformed(protocol, reason))?;
    let dir = kind.dir(settings);
    tokio::fs::create_dir_all(&dir).await?;
    let filename = kind.filename(protocol);
    let file_path = dir.join(&filename);
    let hash_key = CacheKey::AirdropsHash(filename);

    let cached_hash = store.get(&hash_key).await?;
    let file_exists = tokio::fs::try_exists(&file_path).await.unwrap_or(false);
    if file_exists && cached_hash.as_deref() == Some(index_hash) {
        debug!("Using cached airdrop data {}", file_path.display());
        metrics::increment_cache_hit("airdrops_payload");
        return Ok(tokio::fs::read_to_string(&file_path).await?);
    }
    metrics::increment_cache_miss("airdrops_payload");

    let url = settings.airdrops.repo_url(remote_path);
    let response = http.get(&url, None).await?;
    metrics::increment_remote_fetch("payload");
    if !response.is_success() {
        return Err(AirdropError::Remote(format!(
            "{} returned status {}",
            url, response.status
        )));
    }

    let content = response
        .text()
        .map_err(|e| AirdropError::malformed(protocol, e.to_string()))?
        .to_string();
    let content_hash = sha256_hex(&response.body);
    if content_hash != index_hash {
        debug!(
            "Content hash of {} is {}, index says {}",
            url, content_hash, index_hash
        );
    }

    kind.validate(protocol, &content)?;

    tokio::fs::write(&file_path, &content).await?;
    store.set(hash_key, index_hash.to_string()).await?;
    info!("Downloaded airdrop data for {} into {}", protocol, file_path.display());
    Ok(content)
}

/// A claim CSV needs a header with at least an address and an amount column.
fn validate_csv(protocol: &str, content: &str) -> Result<()> {
    let header = content.lines().next().unwrap_or("").trim();
    if header.is_empty() {
        return Err(AirdropError::malformed(protocol, "CSV is empty"));
    }
    if header.split(',').count() < 2 {
        return Err(AirdropError::malformed(
            protocol,
            format!("CSV header `{}` has fewer than 2 columns", header),
        ));
    }
    Ok(())
}

fn parse_poap_holders(protocol: &str, content: &str) -> Result<IndexMap<String, Vec<u64>>> {
    serde_json::from_str(content).map_err(|e| AirdropError::malformed(protocol, e.to_string()))
}

/// Parses `address,amount[,...]` rows after the header.
///
/// Invalid rows are skipped with a warning naming the row, `[]` for an empty
/// line. Raw-unit protocols have their amounts shifted by 18 decimals.
pub fn parse_airdrop_csv(
    protocol: &str,
    content: &str,
    raw_units: bool,
    messages: &MessagesAggregator,
) -> Vec<(Address, Decimal)> {
    let mut rows = Vec::new();
    for line in content.lines().skip(1) {
        let line = line.trim_end_matches('\r');
        let fields: Vec<&str> = if line.is_empty() {
            Vec::new()
        } else {
            line.split(',').map(str::trim).collect()
        };

        match parse_row(&fields, raw_units) {
            Some(row) => rows.push(row),
            None => messages.add_warning(format!(
                "Skipping airdrop CSV for {} because it contains an invalid row: {:?}",
                protocol, fields
            )),
        }
    }
    rows
}

fn parse_row(fields: &[&str], raw_units: bool) -> Option<(Address, Decimal)> {
    let [address, amount, ..] = fields else {
        return None;
    };
    let address = string_to_address(address).ok()?;
    let mut amount = parse_amount(amount).ok()?;
    if raw_units {
        amount = raw_to_token_amount(amount, RAW_UNIT_DECIMALS).ok()?;
    }
    Some((address, amount.normalize()))
}
