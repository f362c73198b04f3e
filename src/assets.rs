use crate::errors::{AirdropError, Result};
use crate::settings::AssetSettings;
use crate::types::{AssetType, NewAssetData};
use dashmap::DashMap;
use log::info;

/// An asset known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub identifier: String,
    pub name: String,
    pub symbol: String,
    pub asset_type: AssetType,
    pub chain_id: Option<u64>,
    pub address: Option<String>,
    pub decimals: Option<u8>,
    pub coingecko: Option<String>,
    pub cryptocompare: Option<String>,
}

impl Asset {
    pub fn from_new_asset_data(identifier: &str, data: &NewAssetData) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: data.name.clone(),
            symbol: data.symbol.clone(),
            asset_type: data.asset_type.clone(),
            chain_id: data.chain_id,
            address: data.address.clone(),
            decimals: data.decimals,
            coingecko: data.coingecko.clone(),
            cryptocompare: data.cryptocompare.clone(),
        }
    }

    /// Minimal EVM token entry, for seeding catalogs
    pub fn evm_token(identifier: &str, name: &str, symbol: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            asset_type: AssetType::EvmToken,
            chain_id: None,
            address: None,
            decimals: Some(18),
            coingecko: None,
            cryptocompare: None,
        }
    }
}

impl From<&AssetSettings> for Asset {
    fn from(settings: &AssetSettings) -> Self {
        Self {
            decimals: Some(settings.decimals),
            ..Asset::evm_token(&settings.identifier, &settings.name, &settings.symbol)
        }
    }
}

/// Tokens of the airdrops listed in the public index that carry no `new_asset_data`.
///
/// (identifier, name, symbol), all with 18 decimals.
pub const KNOWN_AIRDROP_ASSETS: &[(&str, &str, &str)] = &[
    ("eip155:1/erc20:0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984", "Uniswap", "UNI"),
    ("eip155:1/erc20:0x111111111117dC0aa78b770fA6A738034120C302", "1inch", "1INCH"),
    ("eip155:1/erc20:0xF88baf18FAB7e330fa0C4F83949E23F52FECECce", "Grain", "GRAIN"),
    ("eip155:1/erc20:0xc770EEfAd204B5180dF6a14Ee197D99d808ee52d", "ShapeShift FOX", "FOX"),
    ("eip155:1/erc20:0xBFAbdE619ed5C4311811cF422562709710DB587d", "DIVA Token", "DIVA"),
    ("eip155:1/erc20:0x77777FeDdddFfC19Ff86DB637967013e6C6A116C", "Tornado Cash", "TORN"),
    ("eip155:1/erc20:0xC18360217D8F7Ab5e7c516566761Ea12Ce7F9D72", "Ethereum Name Service", "ENS"),
    ("eip155:1/erc20:0xDEf1CA1fb7FBcDC777520aa7f396b4E015F497aB", "CoW Protocol", "COW"),
    ("eip155:100/erc20:0xc20C9C13E853fc64d054b73fF21d3636B2d97eaB", "CoW Protocol (Gnosis)", "COW"),
    ("eip155:1/erc20:0x5aFE3855358E112B5647B952709E6165e1c1eEEe", "Safe", "SAFE"),
    ("eip155:1/erc20:0xcAfE001067cDEF266AfB7Eb5A286dCFD277f3dE5", "ParaSwap", "PSP"),
    ("eip155:1/erc20:0xf1Dc500FdE233A4055e25e5BbF516372BC4F6871", "Saddle DAO", "SDL"),
    ("eip155:1/erc20:0xa456b515303B2Ce344E9d2601f91270f8c2Fea5E", "Cornichon", "CORN"),
    ("eip155:1/erc20:0x5283D291DBCF85356A21bA090E6db59121208b44", "Blur", "BLUR"),
    ("eip155:10/erc20:0x4200000000000000000000000000000000000042", "Optimism", "OP"),
    ("eip155:42161/erc20:0x912CE59144191C1204E64559FE8253a0e49E6548", "Arbitrum", "ARB"),
];

/// Asset resolution collaborator.
pub trait AssetCatalog: Send + Sync {
    fn resolve(&self, identifier: &str) -> Option<Asset>;

    /// Registers `data` under `identifier`.
    ///
    /// Returns `Ok(false)` without touching the catalog when the identifier is
    /// already known.
    fn register(&self, identifier: &str, data: &NewAssetData) -> Result<bool>;
}

#[derive(Debug, Default)]
pub struct MemoryAssetCatalog {
    assets: DashMap<String, Asset>,
}

impl MemoryAssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(assets: impl IntoIterator<Item = Asset>) -> Self {
        let catalog = Self::new();
        for asset in assets {
            catalog.assets.insert(asset.identifier.clone(), asset);
        }
        catalog
    }

    /// Catalog holding [`KNOWN_AIRDROP_ASSETS`] plus `extra`.
    ///
    /// An `extra` entry with a built-in identifier replaces the built-in one.
    pub fn seeded(extra: &[AssetSettings]) -> Self {
        let known = KNOWN_AIRDROP_ASSETS
            .iter()
            .map(|(identifier, name, symbol)| Asset::evm_token(identifier, name, symbol));
        Self::with_assets(known.chain(extra.iter().map(Asset::from)))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetCatalog for MemoryAssetCatalog {
    fn resolve(&self, identifier: &str) -> Option<Asset> {
        self.assets.get(identifier).map(|entry| entry.value().clone())
    }

    fn register(&self, identifier: &str, data: &NewAssetData) -> Result<bool> {
        if self.assets.contains_key(identifier) {
            return Ok(false);
        }
        data.validate()
            .map_err(|reason| AirdropError::malformed(identifier, reason))?;

        self.assets
            .entry(identifier.to_string())
            .or_insert_with(|| Asset::from_new_asset_data(identifier, data));
        info!("Registered new asset {} ({})", identifier, data.symbol);
        Ok(true)
    }
}
