//! # Airdrop Checker
//!
//! A Rust library that keeps a local copy of a remote airdrop index and
//! reports, for a set of Ethereum addresses, which airdrops they are eligible
//! for and whether they already claimed them.
//!
//! ## Overview
//!
//! The crate separates synchronization of remote data from the eligibility
//! computation. It focuses on:
//!
//! - **Index sync**: Conditional fetch of the airdrop index driven by its ETag
//! - **Payload cache**: Per-protocol CSV/JSON files re-downloaded only on hash change
//! - **Parsing**: Typed airdrop records, with new assets registered on the fly
//! - **Eligibility**: Per-address amounts and claim status within a tolerance band
//!
//! ## Architecture
//!
//! ### Sync Layer
//! Fetches `index_v2.json` and caches it together with its ETag in a key/value
//! store. Payload files live under `<data_dir>/airdrops` and
//! `<data_dir>/airdrops/poap`, their index hashes in the same store.
//!
//! ### Eligibility Layer
//! Reads every non-expired, large enough token airdrop and every POAP airdrop,
//! and cross-checks the token amounts against recorded airdrop receive events.
//!
//! ### Collaborators
//! The HTTP client, cache store, asset catalog, history events store and
//! clock are traits with in-memory and PostgreSQL implementations.

// Core Types
/// Airdrop records and result types
pub mod types;
/// Error types
pub mod errors;

// Collaborators
/// HTTP client abstraction
pub mod http_client;
/// Key/value cache store
pub mod cache;
/// Asset catalog
pub mod assets;
/// Historical events store
pub mod history;
/// Warning/error sink
pub mod messages;

// Sync Layer
/// Airdrop index fetch and caching
pub mod metadata;
/// Index entry parsing
pub mod parser;
/// Per-protocol payload fetch and caching
pub mod payload;

// Eligibility Layer
/// Airdrop eligibility computation
pub mod eligibility;

// Infrastructure
/// PostgreSQL database integration
pub mod database;
/// Metrics and observability
pub mod metrics;
/// General utilities
pub mod utils;

// Settings & Configuration
/// Configuration management
pub mod settings;

// Re-exports for convenience
pub use eligibility::AirdropChecker;
pub use errors::{AirdropError, Result};
pub use settings::Settings;
pub use types::{AddressAirdrop, AirdropCheckResult, AirdropsMetadata};
