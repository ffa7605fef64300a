//! Metric names and label values

/// Connections opened by `connect` or `set_resource`
pub const CONNECTIONS_OPENED: &str = "db_adapter_connections_opened_total";
/// Handle creation failures
pub const CONNECTIONS_FAILED: &str = "db_adapter_connections_failed_total";
/// Handles released
pub const CONNECTIONS_CLOSED: &str = "db_adapter_connections_closed_total";
/// Transactions started
pub const TRANSACTIONS_BEGUN: &str = "db_adapter_transactions_begun_total";
/// Transactions finished, labelled by outcome
pub const TRANSACTIONS_FINISHED: &str = "db_adapter_transactions_finished_total";
/// Statements executed, labelled by status
pub const QUERIES_EXECUTED: &str = "db_adapter_queries_executed_total";

/// Time spent creating a handle
pub const CONNECT_DURATION: &str = "db_adapter_connect_duration_ms";
/// Time spent in the statement executor
pub const QUERY_DURATION: &str = "db_adapter_query_duration_ms";
/// Time between begin and commit/rollback
pub const TRANSACTION_DURATION: &str = "db_adapter_transaction_duration_ms";

/// Handle came from `Driver::create`
pub const ORIGIN_CREATED: &str = "created";
/// Handle was adopted through `set_resource`
pub const ORIGIN_ADOPTED: &str = "adopted";

/// Transaction committed
pub const OUTCOME_COMMIT: &str = "commit";
/// Transaction rolled back
pub const OUTCOME_ROLLBACK: &str = "rollback";

/// Statement succeeded
pub const STATUS_OK: &str = "ok";
/// Statement failed
pub const STATUS_ERROR: &str = "error";
