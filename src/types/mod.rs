//! Data model shared by the synchronization pipeline and the eligibility computation.

pub mod airdrop;
pub mod conversions;
pub mod results;

pub use airdrop::{AirdropRecord, AirdropsMetadata, AssetType, NewAssetData, PoapRecord};
pub use results::{checksummed, AddressAirdrop, AirdropCheckResult, AirdropClaim, PoapClaim, POAP_RESULT_KEY};
