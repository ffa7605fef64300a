//! Metrics for connection lifecycle and transaction activity
//!
//! Everything here records through the `metrics` facade. Nothing is exported
//! unless the application installs a recorder (Prometheus, StatsD, ...).
//!
//! * `counters`: event counts (connections, transactions, queries)
//! * `histograms`: durations in milliseconds
//! * `labels`: metric names and label values

pub mod counters;
pub mod histograms;
pub mod labels;
