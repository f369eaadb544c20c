//! Observability (metrics, tracing)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber using the configured filter,
/// overridable through `RUST_LOG`.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.to_string()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    units_loaded: AtomicU64,
    handlers_registered: AtomicU64,
    tokens_issued: AtomicU64,
    validations_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit_loaded(&self) {
        self.units_loaded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "units_loaded", "Metric incremented");
    }

    pub fn handlers_registered(&self, count: u64) {
        self.handlers_registered.fetch_add(count, Ordering::Relaxed);
        tracing::debug!(counter = "handlers_registered", count, "Metric incremented");
    }

    pub fn token_issued(&self) {
        self.tokens_issued.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "tokens_issued", "Metric incremented");
    }

    pub fn validation_failed(&self) {
        self.validations_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "validations_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            units_loaded: self.units_loaded.load(Ordering::Relaxed),
            handlers_registered: self.handlers_registered.load(Ordering::Relaxed),
            tokens_issued: self.tokens_issued.load(Ordering::Relaxed),
            validations_failed: self.validations_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub units_loaded: u64,
    pub handlers_registered: u64,
    pub tokens_issued: u64,
    pub validations_failed: u64,
}
