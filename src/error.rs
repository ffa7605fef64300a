//! Error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Handle creation failed (authentication, network or configuration).
    ///
    /// Carries the driver's message unchanged; no re-classification happens here.
    #[error("connection error: {0}")]
    Connection(String),

    /// Operation requires a live handle and none is present
    #[error("not connected: `{operation}` requires an open connection")]
    NotConnected {
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Commit or rollback without an open transaction
    #[error("no active transaction: `{operation}` called outside a transaction")]
    NoActiveTransaction {
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Statement execution failed (propagated from the executor)
    #[error("query error: {0}")]
    Query(String),

    /// Handle-level failure (autocommit switch, commit, rollback, teardown)
    #[error("driver error: {0}")]
    Driver(String),

    /// Invalid configuration or connection string
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid connection state
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// The driver reports the capability as disabled
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Stable label for metrics and logs
    pub fn category(&self) -> &'static str {
        match self {
            Error::Connection(_) => "connection",
            Error::NotConnected { .. } => "not_connected",
            Error::NoActiveTransaction { .. } => "no_active_transaction",
            Error::Query(_) => "query",
            Error::Driver(_) => "driver",
            Error::Config(_) => "config",
            Error::InvalidState { .. } => "invalid_state",
            Error::Unsupported(_) => "unsupported",
        }
    }

    /// Whether the caller may retry the operation.
    ///
    /// Only handle creation failures qualify; this layer itself never retries.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}
