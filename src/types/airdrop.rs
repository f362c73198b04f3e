use crate::utils::Timestamp;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A token airdrop entry of the remote index (`airdrops` namespace).
///
/// Created from the index on every sync and replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropRecord {
    /// Path of the claim CSV, relative to the repository base URL
    pub csv_path: String,
    /// Hash of the CSV published by the data owner. Drives re-downloads.
    pub csv_hash: String,
    pub asset_identifier: String,
    /// Claim page
    pub url: String,
    pub name: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    /// After this timestamp the airdrop can no longer be claimed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_time: Option<Timestamp>,
    /// Present when the airdropped token is not yet known to the asset catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_asset_data: Option<NewAssetData>,
}

impl AirdropRecord {
    /// Name of the local payload file and of its hash cache entry
    pub fn filename(protocol: &str) -> String {
        format!("{}.csv", protocol)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.cutoff_time, Some(cutoff) if now >= cutoff)
    }
}

/// A POAP airdrop entry of the remote index (`poap_airdrops` namespace).
///
/// Serialized remotely as the ordered tuple `[json_path, url, name, hash]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoapRecord {
    pub json_path: String,
    pub url: String,
    pub name: String,
    pub hash: String,
}

impl PoapRecord {
    pub fn filename(protocol: &str) -> String {
        format!("{}.json", protocol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetType {
    EvmToken,
    Other(String),
}

impl From<String> for AssetType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "EVM_TOKEN" => AssetType::EvmToken,
            _ => AssetType::Other(s),
        }
    }
}

impl From<AssetType> for String {
    fn from(t: AssetType) -> Self {
        match t {
            AssetType::EvmToken => "EVM_TOKEN".to_string(),
            AssetType::Other(s) => s,
        }
    }
}

/// Descriptor used to register an airdropped token in the asset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssetData {
    pub asset_type: AssetType,
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coingecko: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cryptocompare: Option<String>,
}

impl NewAssetData {
    /// EVM tokens need an address, a chain and decimals to be registered.
    pub fn validate(&self) -> Result<(), String> {
        if self.asset_type != AssetType::EvmToken {
            return Ok(());
        }
        let mut missing = Vec::new();
        if self.address.is_none() {
            missing.push("address");
        }
        if self.chain_id.is_none() {
            missing.push("chain_id");
        }
        if self.decimals.is_none() {
            missing.push("decimals");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("EVM token is missing {}", missing.join(", ")))
        }
    }
}

/// Parsed remote index, in index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirdropsMetadata {
    pub airdrops: IndexMap<String, AirdropRecord>,
    pub poap_airdrops: IndexMap<String, PoapRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_poap_record_from_tuple() {
        let record: PoapRecord = serde_json::from_value(json!([
            "airdrops/poap/poap_aave_v2_pioneers.json",
            "https://poap.delivery/aave-v2-pioneers",
            "AAVE V2 Pioneers",
            "388003b6c0dc589981ce9e962d6d8b6b2148c72ccf6ec3578ab32d63b547f903",
        ]))
        .unwrap();
        assert_eq!(record.json_path, "airdrops/poap/poap_aave_v2_pioneers.json");
        assert_eq!(record.name, "AAVE V2 Pioneers");
        assert!(serde_json::from_value::<PoapRecord>(json!(["only", "three", "items"])).is_err());
    }

    #[test]
    fn test_airdrop_record_optional_fields() {
        let record: AirdropRecord = serde_json::from_value(json!({
            "csv_path": "airdrops/shutter.csv",
            "csv_hash": "d4427f41",
            "asset_identifier": "eip155:1/erc20:0xe485E2f1bab389C08721B291f6b59780feC83Fd7",
            "url": "https://claim.shutter.network/",
            "name": "SHU",
            "icon": "shutter.png",
            "cutoff_time": 1721000000,
            "new_asset_data": {
                "asset_type": "SOLANA_TOKEN",
                "name": "Some Non EVM Token",
                "symbol": "NONEVM",
            },
        }))
        .unwrap();
        assert_eq!(record.cutoff_time, Some(1721000000));
        assert!(record.icon_path.is_none());
        let new_asset = record.new_asset_data.as_ref().unwrap();
        assert_eq!(new_asset.asset_type, AssetType::Other("SOLANA_TOKEN".to_string()));
        assert!(new_asset.validate().is_ok());

        assert!(!record.is_expired(1720999999));
        assert!(record.is_expired(1721000000));
        assert!(record.is_expired(1721000001));
    }

    #[test]
    fn test_evm_new_asset_requires_address() {
        let data = NewAssetData {
            asset_type: AssetType::EvmToken,
            name: "Shutter".to_string(),
            symbol: "SHU".to_string(),
            address: None,
            chain_id: Some(1),
            decimals: Some(18),
            coingecko: None,
            cryptocompare: None,
        };
        assert_eq!(data.validate().unwrap_err(), "EVM token is missing address");
    }
}
