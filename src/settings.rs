use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Directory (relative to `data_dir`) holding one CSV per token airdrop
pub const AIRDROPS_DIR_NAME: &str = "airdrops";
/// Directory (relative to `data_dir`) holding one JSON per POAP airdrop
pub const AIRDROPS_POAP_DIR_NAME: &str = "airdrops/poap";

fn default_repo_base() -> String {
    "https://raw.githubusercontent.com/rotki/data/main".to_string()
}

fn default_timeout_seconds() -> u64 {
    90
}

fn default_smallest_airdrop_size() -> Decimal {
    Decimal::from(20_900)
}

fn default_tolerance() -> Decimal {
    // 0.1
    Decimal::new(1, 1)
}

fn default_raw_unit_protocols() -> Vec<String> {
    vec![
        "grain".to_string(),
        "cow_mainnet".to_string(),
        "cow_gnosis".to_string(),
    ]
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_schema() -> String {
    "airdrop_checker".to_string()
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct AirdropSettings {
    /// Full URL of the index document. Derived from `repo_base` when unset.
    #[serde(default)]
    pub index_url: Option<String>,
    /// Base URL every `csv_path`/`json_path`/`icon_path` is relative to
    #[serde(default = "default_repo_base")]
    pub repo_base: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Token airdrops distributing less than this in total are not reported
    #[serde(default = "default_smallest_airdrop_size")]
    pub smallest_airdrop_size: Decimal,
    /// Default upward tolerance when matching claim events
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
    /// Protocols whose CSV amounts are integers in 18-decimal base units
    #[serde(default = "default_raw_unit_protocols")]
    pub raw_unit_protocols: Vec<String>,
}

impl AirdropSettings {
    pub fn index_url(&self) -> String {
        match &self.index_url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!("{}/airdrops/index_v2.json", self.repo_base.trim_end_matches('/')),
        }
    }

    /// Absolute URL for a path relative to the data repository
    pub fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.repo_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn is_raw_unit_protocol(&self, protocol: &str) -> bool {
        self.raw_unit_protocols.iter().any(|p| p == protocol)
    }
}

impl Default for AirdropSettings {
    fn default() -> Self {
        Self {
            index_url: None,
            repo_base: default_repo_base(),
            timeout_seconds: default_timeout_seconds(),
            smallest_airdrop_size: default_smallest_airdrop_size(),
            tolerance: default_tolerance(),
            raw_unit_protocols: default_raw_unit_protocols(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// Postgres URL. In-memory stores are used when absent.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            schema: default_schema(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_asset_decimals() -> u8 {
    18
}

/// Asset known to the catalog before any index is parsed (`[[assets]]` in `Config.toml`).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AssetSettings {
    pub identifier: String,
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_asset_decimals")]
    pub decimals: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub airdrops: AirdropSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Added on top of the built-in airdrop tokens
    #[serde(default)]
    pub assets: Vec<AssetSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            airdrops: AirdropSettings::default(),
            database: DatabaseSettings::default(),
            assets: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads `Config.toml` (optional) and `AIRDROP_*` environment overrides
    /// (nested keys use `__`, e.g. `AIRDROP_AIRDROPS__TIMEOUT_SECONDS`).
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("Config.toml").required(false))
            .add_source(
                Environment::with_prefix("AIRDROP")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true),
            )
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        // Lists are awkward through `Environment`, accept JSON or comma separated
        if let Ok(raw) = env::var("AIRDROP_RAW_UNIT_PROTOCOLS") {
            if let Some(list) = parse_string_list(&raw) {
                settings.airdrops.raw_unit_protocols = list;
            }
        }

        if settings.database.url.is_none() {
            if let Ok(url) = env::var("DATABASE_URL") {
                if !url.trim().is_empty() {
                    settings.database.url = Some(url);
                }
            }
        }

        Ok(settings)
    }

    pub fn airdrops_dir(&self) -> PathBuf {
        self.data_dir.join(AIRDROPS_DIR_NAME)
    }

    pub fn poap_airdrops_dir(&self) -> PathBuf {
        self.data_dir.join(AIRDROPS_POAP_DIR_NAME)
    }
}

fn parse_string_list(input: &str) -> Option<Vec<String>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(vec![]);
    }

    if trimmed.starts_with('[') {
        if let Ok(v) = serde_json::from_str::<Vec<String>>(trimmed) {
            return Some(v);
        }
        let without_brackets = trimmed.trim_start_matches('[').trim_end_matches(']');
        return Some(split_list(without_brackets));
    }

    Some(split_list(trimmed))
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
