//! Shared fixtures for the integration tests: a scripted remote repository
//! and a small airdrop index.

#![allow(dead_code)]

use airdrop_checker::assets::{Asset, MemoryAssetCatalog};
use airdrop_checker::errors::{AirdropError, Result};
use airdrop_checker::http_client::{HttpFetcher, HttpResponse};
use airdrop_checker::settings::{AirdropSettings, Settings};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub const REPO_BASE: &str = "https://data.test/main";
pub const INDEX_URL: &str = "https://data.test/main/airdrops/index_v2.json";

pub const ADDR1: &str = "0x2B888954421b424C5D3D9Ce9bB67c9bD47537d12";
pub const ADDR2: &str = "0x51985CE8BB9AB1708746b24e22e37CD7A980Ec24";
pub const ADDR3: &str = "0x043e2a6047e50710e0f5189DBA7623C4A183F871";

pub const UNI: &str = "eip155:1/erc20:0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984";
pub const GRAIN: &str = "eip155:1/erc20:0xF88baf18FAB7e330fa0C4F83949E23F52FECECce";
pub const DIVA: &str = "eip155:1/erc20:0xBFAbdE619ed5C4311811cF422562709710DB587d";
pub const FOX: &str = "eip155:1/erc20:0xc770EEfAd204B5180dF6a14Ee197D99d808ee52d";

pub const DIVA_CUTOFF: i64 = 1_721_000_000;

/// GET recorded by [`MockRemote`]: url and the `If-None-Match` value sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub url: String,
    pub etag: Option<String>,
}

/// In-memory stand-in for the data repository.
///
/// Answers `304` when the client sends the ETag currently attached to a path,
/// `404` for unknown paths, and fails every request while unreachable.
#[derive(Debug, Default)]
pub struct MockRemote {
    files: Mutex<HashMap<String, (Vec<u8>, Option<String>)>>,
    calls: Mutex<Vec<Call>>,
    unreachable: AtomicBool,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, path: &str, body: impl Into<Vec<u8>>, etag: Option<&str>) {
        self.files.lock().unwrap().insert(
            format!("{}/{}", REPO_BASE, path),
            (body.into(), etag.map(str::to_string)),
        );
    }

    pub fn remove(&self, path: &str) {
        self.files
            .lock()
            .unwrap()
            .remove(&format!("{}/{}", REPO_BASE, path));
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        let url = format!("{}/{}", REPO_BASE, path);
        self.calls().iter().filter(|c| c.url == url).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl HttpFetcher for MockRemote {
    async fn get(&self, url: &str, etag: Option<&str>) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            etag: etag.map(str::to_string),
        });
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AirdropError::Remote(format!("{} is unreachable", url)));
        }

        let files = self.files.lock().unwrap();
        let Some((body, current_etag)) = files.get(url) else {
            return Ok(HttpResponse {
                status: 404,
                etag: None,
                body: Vec::new(),
            });
        };
        if etag.is_some() && etag == current_etag.as_deref() {
            return Ok(HttpResponse::not_modified());
        }
        let mut response = HttpResponse::ok(body.clone());
        response.etag = current_etag.clone();
        Ok(response)
    }
}

pub fn test_settings(data_dir: &Path) -> Settings {
    Settings {
        data_dir: data_dir.to_path_buf(),
        airdrops: AirdropSettings {
            repo_base: REPO_BASE.to_string(),
            smallest_airdrop_size: Decimal::ZERO,
            ..AirdropSettings::default()
        },
        ..Settings::default()
    }
}

pub fn catalog() -> MemoryAssetCatalog {
    MemoryAssetCatalog::with_assets([
        Asset::evm_token(UNI, "Uniswap", "UNI"),
        Asset::evm_token(GRAIN, "Grain", "GRAIN"),
        Asset::evm_token(DIVA, "DIVA Token", "DIVA"),
    ])
}

pub fn uniswap_csv() -> String {
    format!(
        "address,uni,is_lp,is_user,is_socks\n{ADDR1},400,False,True,False\n{ADDR2},630.374421472277638654,True,True,False\n"
    )
}

pub fn grain_csv() -> String {
    format!("address,tokens\n{ADDR2},16301717650649890035791\n{ADDR3},5000000000000000000\n")
}

pub fn diva_csv() -> String {
    format!("address,amount\n{ADDR1},8000\n{ADDR3},12900\n")
}

pub fn fox_csv() -> String {
    format!("address,amount\n{ADDR1},1000\n")
}

pub fn poap_json() -> String {
    format!("{{\"{ADDR1}\": [566], \"{ADDR3}\": [1, 2]}}")
}

pub fn index_json() -> Value {
    json!({
        "airdrops": {
            "uniswap": {
                "csv_path": "airdrops/uniswap.csv",
                "csv_hash": "uni-v1",
                "asset_identifier": UNI,
                "url": "https://app.uniswap.org/",
                "name": "Uniswap",
                "icon": "uniswap.svg",
            },
            "grain": {
                "csv_path": "airdrops/grain_iou.csv",
                "csv_hash": "grain-v1",
                "asset_identifier": GRAIN,
                "url": "https://claim.sourcecred.io/",
                "name": "SourceCred",
                "icon": "grain.png",
                "icon_path": "airdrops/icons/grain.png",
            },
            "diva": {
                "csv_path": "airdrops/diva.csv",
                "csv_hash": "diva-v1",
                "asset_identifier": DIVA,
                "url": "https://claim.diva.community/",
                "name": "DIVA",
                "icon": "diva.svg",
                "cutoff_time": DIVA_CUTOFF,
            },
            "shapeshift": {
                "csv_path": "airdrops/shapeshift.csv",
                "csv_hash": "fox-v1",
                "asset_identifier": FOX,
                "url": "https://shapeshift.com/shapeshift-decentralize-airdrop",
                "name": "ShapeShift",
                "icon": "shapeshift.svg",
            },
        },
        "poap_airdrops": {
            "aave_v2_pioneers": [
                "airdrops/poap/poap_aave_v2_pioneers.json",
                "https://poap.delivery/aave-v2-pioneers",
                "AAVE V2 Pioneers",
                "poap-v1",
            ],
        },
    })
}

/// Serves the index under `etag` and every payload it references.
pub fn serve_fixture(remote: &MockRemote, etag: &str) {
    remote.serve("airdrops/index_v2.json", index_json().to_string(), Some(etag));
    remote.serve("airdrops/uniswap.csv", uniswap_csv(), None);
    remote.serve("airdrops/grain_iou.csv", grain_csv(), None);
    remote.serve("airdrops/diva.csv", diva_csv(), None);
    remote.serve("airdrops/shapeshift.csv", fox_csv(), None);
    remote.serve("airdrops/poap/poap_aave_v2_pioneers.json", poap_json(), None);
}
