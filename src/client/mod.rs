//! High-level entry points
//!
//! * `ConnectionInfo`: connection string parsing
//! * `Adapter`: driver + connection pair built from a connection string

mod adapter;
pub mod connection_string;

pub use adapter::Adapter;
pub use connection_string::ConnectionInfo;
