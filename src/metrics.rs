// src/metrics.rs

#[cfg(feature = "observability")]
pub use metrics::{counter, describe_counter, gauge};

// NOTE: When observability feature is disabled, provide stub implementations
#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! counter {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! gauge {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_counter {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
pub use crate::{counter, describe_counter, gauge};

/// Registers descriptions for every metric emitted by the crate.
pub fn describe_metrics() {
    describe_counter!("cache_hits_total", "Cache lookups that found a value");
    describe_counter!("cache_miss_total", "Cache lookups that found nothing");
    describe_counter!("remote_fetch_total", "HTTP requests issued, by kind");
    describe_counter!("airdrop_skipped_total", "Protocols skipped, by reason");
}

/// Installs the Prometheus exporter on `addr` (e.g. `0.0.0.0:9000`).
#[cfg(feature = "observability")]
pub fn init_prometheus_exporter(addr: std::net::SocketAddr) -> anyhow::Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}

pub fn increment_cache_hit(cache_name: &str) {
    counter!("cache_hits_total", 1, "cache" => cache_name.to_string());
}

pub fn increment_cache_miss(cache_name: &str) {
    counter!("cache_miss_total", 1, "cache" => cache_name.to_string());
}

pub fn increment_remote_fetch(kind: &'static str) {
    counter!("remote_fetch_total", 1, "kind" => kind);
}

pub fn increment_airdrop_skipped(reason: &'static str) {
    counter!("airdrop_skipped_total", 1, "reason" => reason);
}

pub fn set_reported_addresses(count: usize) {
    gauge!("airdrop_reported_addresses", count as f64);
}
