use super::conversions::address_to_checksum;
use ethers::types::Address;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

/// Protocol key under which all POAP claims of an address are grouped
pub const POAP_RESULT_KEY: &str = "poap";

/// Token airdrop an address is eligible for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirdropClaim {
    pub amount: Decimal,
    /// Asset identifier
    pub asset: String,
    pub link: String,
    pub claimed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoapClaim {
    /// POAP protocol name
    pub event: String,
    /// Token ids owned by the address
    pub assets: Vec<u64>,
    pub link: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AddressAirdrop {
    Token(AirdropClaim),
    Poap(Vec<PoapClaim>),
}

impl AddressAirdrop {
    pub fn as_token(&self) -> Option<&AirdropClaim> {
        match self {
            AddressAirdrop::Token(claim) => Some(claim),
            AddressAirdrop::Poap(_) => None,
        }
    }

    pub fn as_poap(&self) -> Option<&[PoapClaim]> {
        match self {
            AddressAirdrop::Poap(claims) => Some(claims),
            AddressAirdrop::Token(_) => None,
        }
    }
}

/// address -> protocol -> airdrop, in index order. Built per call, never persisted.
pub type AirdropCheckResult = IndexMap<Address, IndexMap<String, AddressAirdrop>>;

/// View of `result` keyed by EIP-55 checksummed address, for reporting.
///
/// `Address` itself serializes lowercase.
pub fn checksummed(
    result: &AirdropCheckResult,
) -> IndexMap<String, &IndexMap<String, AddressAirdrop>> {
    result
        .iter()
        .map(|(address, airdrops)| (address_to_checksum(address), airdrops))
        .collect()
}
