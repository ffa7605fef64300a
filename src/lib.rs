//! db-adapter: connection lifecycle and transaction state for relational drivers
//!
//! A [`Connection`](connection::Connection) owns one native session handle and
//! tracks its transaction boundaries. The engine itself is reached only through
//! two collaborator traits:
//!
//! * [`Driver`](driver::Driver) creates and destroys the handle
//! * [`StatementExecutor`](driver::StatementExecutor) runs SQL text against it
//!
//! A bundled SQLite driver ([`driver::sqlite`]) implements both.
//!
//! # Example
//!
//! ```no_run
//! use db_adapter::connection::{Connection, ConnectionConfig};
//! use db_adapter::driver::sqlite::SqliteDriver;
//!
//! # fn main() -> db_adapter::Result<()> {
//! let mut conn = Connection::new(SqliteDriver::new(), ConnectionConfig::new(":memory:"));
//! conn.connect()?;
//!
//! conn.begin_transaction()?;
//! conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")?;
//! conn.execute("INSERT INTO t (name) VALUES ('a')")?;
//! conn.commit()?;
//!
//! let result = conn.execute("SELECT name FROM t")?;
//! assert_eq!(result.first_value().and_then(|v| v.as_str()), Some("a"));
//!
//! conn.disconnect()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod connection;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod profiler;
pub mod result;

pub use client::Adapter;
pub use connection::{Connection, ConnectionConfig, ConnectionState};
pub use error::{Error, Result};
pub use result::ResultSet;
