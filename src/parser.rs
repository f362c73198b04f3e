use crate::assets::AssetCatalog;
use crate::messages::MessagesAggregator;
use crate::types::{AirdropRecord, PoapRecord, POAP_RESULT_KEY};
use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

/// Protocol names become payload file names, so they must be a single plain
/// path component.
pub(crate) fn check_protocol_name(protocol: &str) -> Result<(), String> {
    if protocol.is_empty() {
        return Err("name is empty".to_string());
    }
    if protocol.contains("..") {
        return Err("name contains `..`".to_string());
    }
    if let Some(c) = protocol
        .chars()
        .find(|c| matches!(c, '/' | '\\' | ':' | '\0'))
    {
        return Err(format!("name contains {:?}", c));
    }
    Ok(())
}

/// Turns the raw `airdrops` namespace of the index into typed records.
///
/// Malformed entries are dropped with a warning. Entries carrying
/// `new_asset_data` get their asset registered in `catalog` first, so the
/// identifier resolves downstream; registering a known asset is a no-op.
pub fn parse_airdrops(
    catalog: &dyn AssetCatalog,
    messages: &MessagesAggregator,
    raw: &Map<String, Value>,
) -> IndexMap<String, AirdropRecord> {
    let mut records = IndexMap::with_capacity(raw.len());
    for (protocol, entry) in raw {
        if let Err(reason) = check_protocol_name(protocol) {
            messages.add_warning(format!(
                "Skipping airdrop {:?} because of an invalid protocol name: {}",
                protocol, reason
            ));
            continue;
        }
        // POAP claims are reported under this key
        if protocol == POAP_RESULT_KEY {
            messages.add_warning(format!(
                "Skipping airdrop {} because the name is reserved for POAP airdrops",
                protocol
            ));
            continue;
        }

        let record: AirdropRecord = match serde_json::from_value(entry.clone()) {
            Ok(record) => record,
            Err(e) => {
                messages.add_warning(format!(
                    "Skipping airdrop {} because its metadata is malformed: {}",
                    protocol, e
                ));
                continue;
            }
        };

        if let Some(new_asset) = &record.new_asset_data {
            match catalog.register(&record.asset_identifier, new_asset) {
                Ok(true) => debug!(
                    "Airdrop {} registered asset {}",
                    protocol, record.asset_identifier
                ),
                Ok(false) => {}
                Err(e) => {
                    messages.add_warning(format!(
                        "Skipping airdrop {} because its new asset could not be added: {}",
                        protocol, e
                    ));
                    continue;
                }
            }
        }

        records.insert(protocol.clone(), record);
    }
    records
}

/// Turns the raw `poap_airdrops` namespace of the index into typed records.
pub fn parse_poap_airdrops(
    messages: &MessagesAggregator,
    raw: &Map<String, Value>,
) -> IndexMap<String, PoapRecord> {
    let mut records = IndexMap::with_capacity(raw.len());
    for (protocol, entry) in raw {
        if let Err(reason) = check_protocol_name(protocol) {
            messages.add_warning(format!(
                "Skipping POAP airdrop {:?} because of an invalid protocol name: {}",
                protocol, reason
            ));
            continue;
        }
        match serde_json::from_value::<PoapRecord>(entry.clone()) {
            Ok(record) => {
                records.insert(protocol.clone(), record);
            }
            Err(e) => messages.add_warning(format!(
                "Skipping POAP airdrop {} because its metadata is malformed: {}",
                protocol, e
            )),
        }
    }
    records
}
