//! Connection management
//!
//! This module handles:
//! * Connection configuration
//! * Connection lifecycle (connect, adopt, disconnect)
//! * Transaction boundaries and autocommit restoration
//! * State machine enforcement

mod config;
mod conn;
mod state;

pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use conn::Connection;
pub use state::ConnectionState;
