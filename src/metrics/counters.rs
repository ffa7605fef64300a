//! Counter helpers

use super::labels;

/// A handle became owned by a connection
pub fn connection_opened(driver: &'static str, origin: &'static str) {
    ::metrics::counter!(labels::CONNECTIONS_OPENED, "driver" => driver, "origin" => origin)
        .increment(1);
}

/// `Driver::create` failed
pub fn connection_failed(driver: &'static str, category: &'static str) {
    ::metrics::counter!(labels::CONNECTIONS_FAILED, "driver" => driver, "error" => category)
        .increment(1);
}

/// A handle was released
pub fn connection_closed(driver: &'static str) {
    ::metrics::counter!(labels::CONNECTIONS_CLOSED, "driver" => driver).increment(1);
}

/// A transaction was started
pub fn transaction_begun(driver: &'static str) {
    ::metrics::counter!(labels::TRANSACTIONS_BEGUN, "driver" => driver).increment(1);
}

/// A transaction ended with `outcome` (`commit` or `rollback`)
pub fn transaction_finished(driver: &'static str, outcome: &'static str) {
    ::metrics::counter!(labels::TRANSACTIONS_FINISHED, "driver" => driver, "outcome" => outcome)
        .increment(1);
}

/// A statement went through the executor
pub fn query_executed(driver: &'static str, status: &'static str) {
    ::metrics::counter!(labels::QUERIES_EXECUTED, "driver" => driver, "status" => status)
        .increment(1);
}
