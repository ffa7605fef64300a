//! Histogram helpers (all values in milliseconds)

use super::labels;

/// Handle creation time
pub fn connect_duration(driver: &'static str, duration_ms: u64) {
    ::metrics::histogram!(labels::CONNECT_DURATION, "driver" => driver).record(duration_ms as f64);
}

/// Statement execution time
pub fn query_duration(driver: &'static str, duration_ms: u64) {
    ::metrics::histogram!(labels::QUERY_DURATION, "driver" => driver).record(duration_ms as f64);
}

/// Time a transaction stayed open
pub fn transaction_duration(driver: &'static str, outcome: &'static str, duration_ms: u64) {
    ::metrics::histogram!(labels::TRANSACTION_DURATION, "driver" => driver, "outcome" => outcome)
        .record(duration_ms as f64);
}
