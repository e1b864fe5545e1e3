// src/core/metrics.rs

//! Defines and registers Prometheus metrics for service monitoring.
//!
//! This module uses `lazy_static` so that metrics are registered only once
//! for the whole process, no matter how many caches a test suite builds.

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, TextEncoder, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};

lazy_static! {
    // --- Cache Gauges ---
    /// The number of comments currently held by the cache.
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("comment_roulette_cache_size", "Number of comments currently cached.").unwrap();

    // --- Refill Counters ---
    /// Refill attempts that actually called the comment source.
    pub static ref REFILL_ATTEMPTS_TOTAL: Counter =
        register_counter!("comment_roulette_refill_attempts_total", "Total number of comment source fetches.").unwrap();
    /// Fetches that failed or returned nothing.
    pub static ref REFILL_FAILURES_TOTAL: Counter =
        register_counter!("comment_roulette_refill_failures_total", "Total number of fetches that added nothing.").unwrap();
    /// Records that survived deduplication and entered the cache.
    pub static ref RECORDS_ADDED_TOTAL: Counter =
        register_counter!("comment_roulette_records_added_total", "Total number of comments added to the cache.").unwrap();

    // --- Read Counters ---
    /// Random comment reads, labeled `hit` or `empty`.
    pub static ref RANDOM_COMMENT_REQUESTS_TOTAL: CounterVec =
        register_counter_vec!("comment_roulette_random_comment_requests_total", "Total number of random comment reads, labeled by outcome.", &["outcome"]).unwrap();

    // --- Histograms ---
    /// Latency of a single comment source fetch.
    pub static ref SOURCE_FETCH_SECONDS: Histogram =
        register_histogram!("comment_roulette_source_fetch_seconds", "Latency of comment source fetches in seconds.").unwrap();
}

/// Gathers all registered metrics and encodes them in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
