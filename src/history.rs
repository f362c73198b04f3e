use crate::errors::Result;
use async_trait::async_trait;
use ethers::types::Address;
use rust_decimal::Decimal;
use std::fmt;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryEventType {
    Receive,
    Spend,
    Deposit,
    Withdrawal,
    Trade,
    Informational,
}

impl HistoryEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryEventType::Receive => "receive",
            HistoryEventType::Spend => "spend",
            HistoryEventType::Deposit => "deposit",
            HistoryEventType::Withdrawal => "withdrawal",
            HistoryEventType::Trade => "trade",
            HistoryEventType::Informational => "informational",
        }
    }
}

impl fmt::Display for HistoryEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryEventSubType {
    None,
    Airdrop,
    Reward,
    Fee,
    DepositAsset,
    ReturnWrapped,
}

impl HistoryEventSubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryEventSubType::None => "none",
            HistoryEventSubType::Airdrop => "airdrop",
            HistoryEventSubType::Reward => "reward",
            HistoryEventSubType::Fee => "fee",
            HistoryEventSubType::DepositAsset => "deposit asset",
            HistoryEventSubType::ReturnWrapped => "return wrapped",
        }
    }
}

impl fmt::Display for HistoryEventSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded on-chain movement for a tracked address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEvent {
    pub event_identifier: String,
    pub sequence_index: u32,
    pub timestamp_ms: i64,
    /// Tracked address the event belongs to
    pub location_label: Address,
    pub event_type: HistoryEventType,
    pub event_subtype: HistoryEventSubType,
    /// Asset identifier
    pub asset: String,
    pub amount: Decimal,
}

/// Historical events collaborator.
#[async_trait]
pub trait HistoryEventsStore: Send + Sync {
    async fn query_events(
        &self,
        address: Address,
        asset: &str,
        event_type: HistoryEventType,
        event_subtype: HistoryEventSubType,
    ) -> Result<Vec<HistoryEvent>>;

    /// Airdrop receive events of `address` for `asset`
    async fn airdrop_claims(&self, address: Address, asset: &str) -> Result<Vec<HistoryEvent>> {
        self.query_events(
            address,
            asset,
            HistoryEventType::Receive,
            HistoryEventSubType::Airdrop,
        )
        .await
    }
}

#[derive(Debug, Default)]
pub struct MemoryHistoryEvents {
    events: RwLock<Vec<HistoryEvent>>,
}

impl MemoryHistoryEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_history_events(&self, events: impl IntoIterator<Item = HistoryEvent>) {
        self.events.write().await.extend(events);
    }
}

#[async_trait]
impl HistoryEventsStore for MemoryHistoryEvents {
    async fn query_events(
        &self,
        address: Address,
        asset: &str,
        event_type: HistoryEventType,
        event_subtype: HistoryEventSubType,
    ) -> Result<Vec<HistoryEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| {
                e.location_label == address
                    && e.asset == asset
                    && e.event_type == event_type
                    && e.event_subtype == event_subtype
            })
            .cloned()
            .collect())
    }
}
