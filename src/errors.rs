use thiserror::Error;

/// Errors produced while synchronizing airdrop metadata and computing eligibility.
///
/// Only [`AirdropError::Remote`] raised while fetching the index is fatal to a
/// `check_airdrops` call. Every other variant is reported to the warning sink
/// and the offending protocol is skipped.
#[derive(Debug, Error)]
pub enum AirdropError {
    /// Transport failure, unreachable remote or unexpected HTTP status
    #[error("Remote error: {0}")]
    Remote(String),

    /// The downloaded CSV/JSON payload could not be used
    #[error("Airdrop data for {name} is malformed: {reason}")]
    MalformedPayload { name: String, reason: String },

    #[error("Unknown asset {0}")]
    UnknownAsset(String),

    /// Cache store read/write failure
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AirdropError {
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AirdropError::MalformedPayload {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from the network layer.
    pub fn is_remote(&self) -> bool {
        matches!(self, AirdropError::Remote(_))
    }
}

impl From<reqwest::Error> for AirdropError {
    fn from(e: reqwest::Error) -> Self {
        AirdropError::Remote(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AirdropError>;
