// Prometheus metrics for the API
// Cache gauges are refreshed from the cache's own counters at scrape time

use judgeline_engine::CacheStats;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Encoder, Histogram,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "judgeline_requests_total",
        "HTTP requests by route and outcome",
        &["route", "outcome"]
    )
    .expect("requests metric can be registered");
    pub static ref TEST_CASES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "judgeline_test_cases_total",
        "Evaluated test cases by result",
        &["result"]
    )
    .expect("test case metric can be registered");
    pub static ref BATCH_SCORE: Histogram = register_histogram!(
        "judgeline_batch_score_percent",
        "Score percent of evaluated batches",
        vec![0.0, 25.0, 50.0, 75.0, 99.99, 100.0]
    )
    .expect("score metric can be registered");
    static ref CACHE_HITS: IntGauge = register_int_gauge!(
        "judgeline_generation_cache_hits",
        "Generation cache hits since start"
    )
    .expect("cache hits metric can be registered");
    static ref CACHE_MISSES: IntGauge = register_int_gauge!(
        "judgeline_generation_cache_misses",
        "Generation cache misses since start"
    )
    .expect("cache misses metric can be registered");
    static ref CACHE_SIZE: IntGauge = register_int_gauge!(
        "judgeline_generation_cache_entries",
        "Entries currently held by the generation cache"
    )
    .expect("cache size metric can be registered");
}

pub fn record_request(route: &str, outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[route, outcome]).inc();
}

pub fn record_batch(passed: usize, total: usize, score_percent: f64) {
    TEST_CASES_TOTAL
        .with_label_values(&["passed"])
        .inc_by(passed as u64);
    TEST_CASES_TOTAL
        .with_label_values(&["failed"])
        .inc_by((total - passed) as u64);
    if total > 0 {
        BATCH_SCORE.observe(score_percent);
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn render(cache: CacheStats) -> Result<String, prometheus::Error> {
    CACHE_HITS.set(cache.hits as i64);
    CACHE_MISSES.set(cache.misses as i64);
    CACHE_SIZE.set(cache.size as i64);

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
