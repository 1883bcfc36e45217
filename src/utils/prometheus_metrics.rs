// src/utils/prometheus_metrics.rs

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram_vec, Counter,
    CounterVec, Gauge, HistogramVec,
};

// Metrics from the loader
pub static RECORDS_LOADED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "dashboard_records_loaded",
        "Number of records in the most recently loaded dataset."
    )
    .expect("Failed to register RECORDS_LOADED gauge")
});

pub static ROWS_SKIPPED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "dashboard_rows_skipped_total",
        "Total number of input rows dropped because a field could not be parsed."
    )
    .expect("Failed to register ROWS_SKIPPED_TOTAL counter")
});

// Metrics from the executor
pub static PANELS_RENDERED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dashboard_panels_rendered_total",
        "Total number of panel evaluations, by panel and status.",
        &["panel", "status"]
    )
    .expect("Failed to register PANELS_RENDERED_TOTAL counter")
});

pub static PANEL_RENDER_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "dashboard_panel_render_duration_seconds",
        "Histogram of panel evaluation durations.",
        &["panel"]
    )
    .expect("Failed to register PANEL_RENDER_DURATION_SECONDS histogram")
});

// Metrics from the query caches
pub static CACHE_HITS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dashboard_cache_hits_total",
        "Total number of memoized query lookups answered from the cache.",
        &["cache"]
    )
    .expect("Failed to register CACHE_HITS_TOTAL counter")
});

pub static CACHE_MISSES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dashboard_cache_misses_total",
        "Total number of memoized query lookups that had to be computed.",
        &["cache"]
    )
    .expect("Failed to register CACHE_MISSES_TOTAL counter")
});
