//! Driver collaborator contracts
//!
//! This module defines the seams a database engine plugs into:
//! * `Driver`: creates and destroys the native session handle
//! * `Session`: handle-level controls (autocommit, commit, rollback, schema)
//! * `StatementExecutor`: runs SQL text against a handle
//!
//! `sqlite` provides an implementation backed by rusqlite.

pub mod sqlite;

use crate::connection::ConnectionConfig;
use crate::{Result, ResultSet};

/// Driver handle provider
///
/// Owns the knowledge of how to open and close a session for one engine.
/// Retry policy, if any, belongs here rather than in the connection.
pub trait Driver {
    /// Native session handle
    type Handle: Session;

    /// Executor used for `Connection::execute`
    type Executor: StatementExecutor<Self::Handle>;

    /// Short driver name used in logs and metric labels
    fn name(&self) -> &'static str;

    /// Open a new session.
    ///
    /// Failures must be reported as `Error::Connection` carrying the engine's message.
    fn create(&self, config: &ConnectionConfig) -> Result<Self::Handle>;

    /// Close a session, consuming the handle
    fn destroy(&self, handle: Self::Handle) -> Result<()>;

    /// Statement executor for handles of this driver
    fn executor(&self) -> &Self::Executor;

    /// Whether explicit transactions are available in this deployment
    fn supports_transactions(&self) -> bool {
        true
    }
}

/// Handle-level session controls
pub trait Session {
    /// Current autocommit setting
    fn autocommit(&self) -> Result<bool>;

    /// Switch autocommit on or off
    fn set_autocommit(&mut self, enabled: bool) -> Result<()>;

    /// Commit pending work
    fn commit(&mut self) -> Result<()>;

    /// Discard pending work
    fn rollback(&mut self) -> Result<()>;

    /// Active schema (or catalog) name
    fn current_schema(&self) -> Result<String>;

    /// Last generated key of this session, or the current value of the named sequence
    fn last_generated_value(&mut self, name: Option<&str>) -> Result<Option<i64>>;

    /// Cheap liveness check (no round-trip)
    fn is_alive(&self) -> bool {
        true
    }
}

/// Statement executor
pub trait StatementExecutor<H> {
    /// Run `sql` against `handle`.
    ///
    /// Failures must be reported as `Error::Query`.
    fn run(&self, handle: &mut H, sql: &str) -> Result<ResultSet>;
}
