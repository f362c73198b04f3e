use crate::assets::AssetCatalog;
use crate::cache::CacheStore;
use crate::errors::{AirdropError, Result};
use crate::history::HistoryEventsStore;
use crate::http_client::HttpFetcher;
use crate::messages::MessagesAggregator;
use crate::metadata;
use crate::metrics;
use crate::payload;
use crate::settings::Settings;
use crate::types::{
    AddressAirdrop, AirdropCheckResult, AirdropClaim, AirdropsMetadata, PoapClaim, POAP_RESULT_KEY,
};
use crate::utils::{Clock, SystemClock};
use ethers::types::Address;
use indexmap::IndexMap;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

/// Synchronizes airdrop data and reports what a set of addresses can claim.
///
/// Every collaborator is injected: the HTTP client, the cache store, the asset
/// catalog, the historical events store, the warning sink and the clock.
pub struct AirdropChecker {
    settings: Settings,
    http: Arc<dyn HttpFetcher>,
    cache: Arc<dyn CacheStore>,
    assets: Arc<dyn AssetCatalog>,
    events: Arc<dyn HistoryEventsStore>,
    messages: Arc<MessagesAggregator>,
    clock: Arc<dyn Clock>,
}

impl AirdropChecker {
    pub fn new(
        settings: Settings,
        http: Arc<dyn HttpFetcher>,
        cache: Arc<dyn CacheStore>,
        assets: Arc<dyn AssetCatalog>,
        events: Arc<dyn HistoryEventsStore>,
        messages: Arc<MessagesAggregator>,
    ) -> Self {
        Self {
            settings,
            http,
            cache,
            assets,
            events,
            messages,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn messages(&self) -> &MessagesAggregator {
        &self.messages
    }

    /// See [`metadata::fetch_airdrops_metadata`].
    pub async fn fetch_airdrops_metadata(&self) -> Result<AirdropsMetadata> {
        metadata::fetch_airdrops_metadata(
            &self.settings.airdrops,
            self.http.as_ref(),
            self.cache.as_ref(),
            self.assets.as_ref(),
            &self.messages,
        )
        .await
    }

    /// Reports, for every address in `addresses`, the airdrops it is part of.
    ///
    /// A token airdrop is `claimed` when an airdrop receive event of the same
    /// address and asset recorded an amount within
    /// `[amount, amount + tolerance]`.
    ///
    /// Fails only when the index can neither be fetched nor read from cache.
    pub async fn check_airdrops(
        &self,
        addresses: &[Address],
        tolerance: Decimal,
    ) -> Result<AirdropCheckResult> {
        let metadata = match self.fetch_airdrops_metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                let cached = metadata::load_cached_metadata(
                    self.cache.as_ref(),
                    self.assets.as_ref(),
                    &self.messages,
                )
                .await?;
                match cached {
                    Some(metadata) => {
                        self.messages.add_warning(format!(
                            "Could not refresh the airdrops index, using cached data: {}",
                            e
                        ));
                        metadata
                    }
                    None => return Err(e),
                }
            }
        };

        let wanted: HashSet<Address> = addresses.iter().copied().collect();
        let mut found: AirdropCheckResult = IndexMap::new();

        self.check_token_airdrops(&metadata, &wanted, tolerance, &mut found)
            .await?;
        self.check_poap_airdrops(&metadata, &wanted, &mut found).await;

        metrics::set_reported_addresses(found.len());
        info!(
            "Airdrop check found airdrops for {}/{} addresses",
            found.len(),
            wanted.len()
        );
        Ok(found)
    }

    async fn check_token_airdrops(
        &self,
        metadata: &AirdropsMetadata,
        wanted: &HashSet<Address>,
        tolerance: Decimal,
        found: &mut AirdropCheckResult,
    ) -> Result<()> {
        let now = self.clock.now();
        let smallest_size = self.settings.airdrops.smallest_airdrop_size;

        for (protocol, record) in &metadata.airdrops {
            if record.is_expired(now) {
                debug!("Skipping airdrop {}: past its cutoff time", protocol);
                metrics::increment_airdrop_skipped("expired");
                continue;
            }

            let Some(asset) = self.assets.resolve(&record.asset_identifier) else {
                self.messages.add_warning(format!(
                    "Skipping airdrop {}: {}",
                    protocol,
                    AirdropError::UnknownAsset(record.asset_identifier.clone())
                ));
                metrics::increment_airdrop_skipped("unknown_asset");
                continue;
            };

            let content = match payload::get_airdrop_data(
                &self.settings,
                self.http.as_ref(),
                self.cache.as_ref(),
                protocol,
                record,
            )
            .await
            {
                Ok(content) => content,
                Err(e) => {
                    self.messages.add_warning(format!(
                        "Could not get airdrop data for {}: {}",
                        protocol, e
                    ));
                    metrics::increment_airdrop_skipped("payload");
                    continue;
                }
            };

            let rows = payload::parse_airdrop_csv(
                protocol,
                &content,
                self.settings.airdrops.is_raw_unit_protocol(protocol),
                &self.messages,
            );

            let total = rows
                .iter()
                .try_fold(Decimal::ZERO, |acc, (_, amount)| acc.checked_add(*amount))
                .unwrap_or(Decimal::MAX);
            if total < smallest_size {
                debug!(
                    "Skipping airdrop {}: distributes {} in total, below {}",
                    protocol, total, smallest_size
                );
                metrics::increment_airdrop_skipped("too_small");
                continue;
            }

            let icon_url = record
                .icon_path
                .as_deref()
                .map(|path| self.settings.airdrops.repo_url(path));

            for (address, amount) in rows {
                if !wanted.contains(&address) {
                    continue;
                }
                let claimed = self
                    .is_claimed(address, &asset.identifier, amount, tolerance)
                    .await?;
                found.entry(address).or_default().insert(
                    protocol.clone(),
                    AddressAirdrop::Token(AirdropClaim {
                        amount,
                        asset: asset.identifier.clone(),
                        link: record.url.clone(),
                        claimed,
                        icon_url: icon_url.clone(),
                    }),
                );
            }
        }
        Ok(())
    }

    async fn check_poap_airdrops(
        &self,
        metadata: &AirdropsMetadata,
        wanted: &HashSet<Address>,
        found: &mut AirdropCheckResult,
    ) {
        for (protocol, record) in &metadata.poap_airdrops {
            let holders = match payload::get_poap_airdrop_data(
                &self.settings,
                self.http.as_ref(),
                self.cache.as_ref(),
                &self.messages,
                protocol,
                record,
            )
            .await
            {
                Ok(holders) => holders,
                Err(e) => {
                    self.messages.add_warning(format!(
                        "Could not get POAP airdrop data for {}: {}",
                        protocol, e
                    ));
                    metrics::increment_airdrop_skipped("payload");
                    continue;
                }
            };

            for (address, assets) in holders {
                if !wanted.contains(&address) {
                    continue;
                }
                let entry = found
                    .entry(address)
                    .or_default()
                    .entry(POAP_RESULT_KEY.to_string())
                    .or_insert_with(|| AddressAirdrop::Poap(Vec::new()));
                if let AddressAirdrop::Poap(claims) = entry {
                    claims.push(PoapClaim {
                        event: protocol.clone(),
                        assets,
                        link: record.url.clone(),
                        name: record.name.clone(),
                    });
                }
            }
        }
    }

    async fn is_claimed(
        &self,
        address: Address,
        asset: &str,
        amount: Decimal,
        tolerance: Decimal,
    ) -> Result<bool> {
        let upper = amount.checked_add(tolerance).unwrap_or(Decimal::MAX);
        let events = self.events.airdrop_claims(address, asset).await?;
        Ok(events
            .iter()
            .any(|event| event.amount >= amount && event.amount <= upper))
    }
}
