//! Prometheus metrics for the ticket space.
//!
//! This module provides metrics for:
//! - Ticket generation (random vs sequential)
//! - Storage operations (save, load, remove)
//! - Expiration sweeps

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

/// Tickets generated total by mode.
pub static TICKETS_GENERATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketer_tickets_generated_total", "Total tickets generated"),
        &["mode"], // "random", "sequential"
    )
    .unwrap()
});

/// Storage operations total by operation and result.
pub static STORAGE_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketer_storage_operations_total",
            "Total ticket storage operations",
        ),
        &["op", "result"], // op: "save", "load", "remove"; result: "ok", "error"
    )
    .unwrap()
});

/// Expiration sweeps total by result.
pub static SWEEPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketer_sweeps_total", "Total expiration sweeps"),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

/// Entries removed by expiration.
pub static ENTRIES_EXPIRED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketer_entries_expired_total",
        "Total ticket entries removed by expiration",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TICKETS_GENERATED.clone()),
        Box::new(STORAGE_OPERATIONS.clone()),
        Box::new(SWEEPS.clone()),
        Box::new(ENTRIES_EXPIRED.clone()),
    ]
}
