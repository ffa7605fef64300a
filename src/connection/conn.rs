//! Core connection type

use super::config::ConnectionConfig;
use super::state::ConnectionState;
use crate::driver::{Driver, Session, StatementExecutor};
use crate::metrics::labels;
use crate::profiler::Profiler;
use crate::{Error, Result, ResultSet};
use std::time::Instant;

/// One logical session to a database
///
/// Owns at most one driver handle and tracks whether an explicit transaction
/// is open on it. All operations are blocking and take `&mut self`; share a
/// connection across threads only behind an external lock or pool.
///
/// Invariants:
/// * a handle is present iff the state is not `Disconnected`
/// * in `InTransaction` the handle's autocommit is off
/// * `disconnect` leaves neither a handle nor an open transaction behind
pub struct Connection<D: Driver> {
    driver: D,
    config: ConnectionConfig,
    handle: Option<D::Handle>,
    state: ConnectionState,
    prev_autocommit: Option<bool>,
    transaction_started: Option<Instant>,
    profiler: Option<Box<dyn Profiler>>,
}

impl<D: Driver> Connection<D> {
    /// Create a disconnected connection
    pub fn new(driver: D, config: ConnectionConfig) -> Self {
        Self {
            driver,
            config,
            handle: None,
            state: ConnectionState::Disconnected,
            prev_autocommit: None,
            transaction_started: None,
            profiler: None,
        }
    }

    /// Create a connection around an existing handle.
    ///
    /// The handle is owned by the connection from here on.
    pub fn with_resource(driver: D, config: ConnectionConfig, handle: D::Handle) -> Self {
        let mut conn = Self::new(driver, config);
        conn.adopt(handle, labels::ORIGIN_ADOPTED);
        conn
    }

    /// Driver this connection uses
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Connection parameters
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Replace the connection parameters.
    ///
    /// Only allowed while disconnected.
    pub fn set_config(&mut self, config: ConnectionConfig) -> Result<()> {
        if self.state.has_handle() {
            return Err(Error::InvalidState {
                expected: ConnectionState::Disconnected.to_string(),
                actual: self.state.to_string(),
            });
        }
        self.config = config;
        Ok(())
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True if a handle is present and alive
    pub fn is_connected(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_alive())
    }

    /// True while an explicit transaction is open
    pub fn in_transaction(&self) -> bool {
        self.state == ConnectionState::InTransaction
    }

    /// Open the session if needed.
    ///
    /// Does nothing when a handle is already present, whether it was created
    /// here or adopted through `set_resource`.
    pub fn connect(&mut self) -> Result<&mut Self> {
        if self.handle.is_some() {
            return Ok(self);
        }

        let driver = self.driver.name();
        let span = tracing::info_span!("connect", driver, database = %self.config.database);
        let _enter = span.enter();

        let start = Instant::now();
        match self.driver.create(&self.config) {
            Ok(handle) => {
                crate::metrics::histograms::connect_duration(
                    driver,
                    start.elapsed().as_millis() as u64,
                );
                self.adopt(handle, labels::ORIGIN_CREATED);
                tracing::info!("connected");
                Ok(self)
            }
            Err(e) => {
                crate::metrics::counters::connection_failed(driver, e.category());
                tracing::warn!(error = %e, "connect failed");
                Err(e)
            }
        }
    }

    /// Release the handle.
    ///
    /// An open transaction is rolled back first. Calling this while
    /// disconnected does nothing.
    pub fn disconnect(&mut self) -> Result<()> {
        let was_in_transaction = self.in_transaction();
        let Some(mut handle) = self.handle.take() else {
            return Ok(());
        };
        self.state = ConnectionState::Disconnected;
        self.prev_autocommit = None;

        let driver = self.driver.name();
        if was_in_transaction {
            tracing::warn!("disconnecting with an open transaction, rolling back");
            if let Err(e) = handle.rollback() {
                tracing::warn!(error = %e, "rollback before disconnect failed");
            }
            self.record_transaction_end(labels::OUTCOME_ROLLBACK);
        }
        self.transaction_started = None;

        let result = self.driver.destroy(handle);
        crate::metrics::counters::connection_closed(driver);
        match &result {
            Ok(()) => tracing::debug!(driver, "disconnected"),
            Err(e) => tracing::warn!(driver, error = %e, "handle teardown failed"),
        }
        result
    }

    /// Borrow the owned handle
    pub fn resource(&self) -> Result<&D::Handle> {
        self.handle.as_ref().ok_or(Error::NotConnected {
            operation: "resource",
        })
    }

    /// Borrow the owned handle mutably
    pub fn resource_mut(&mut self) -> Result<&mut D::Handle> {
        self.handle.as_mut().ok_or(Error::NotConnected {
            operation: "resource",
        })
    }

    /// Adopt an externally created handle.
    ///
    /// A previously owned handle is released first, so nothing leaks. The new
    /// handle is adopted even if that release fails; the failure is logged.
    pub fn set_resource(&mut self, handle: D::Handle) -> Result<&mut Self> {
        if let Err(e) = self.disconnect() {
            tracing::warn!(error = %e, "releasing the replaced handle failed");
        }
        self.adopt(handle, labels::ORIGIN_ADOPTED);
        Ok(self)
    }

    /// Active schema name
    pub fn current_schema(&self) -> Result<String> {
        self.handle
            .as_ref()
            .ok_or(Error::NotConnected {
                operation: "current_schema",
            })?
            .current_schema()
    }

    /// Open a transaction.
    ///
    /// Connects first when no handle is present yet: a fresh connection can go
    /// straight into a transaction. Calling this inside a transaction is a
    /// no-op; depth is not tracked and the autocommit value saved by the first
    /// call is the one `commit`/`rollback` restore.
    pub fn begin_transaction(&mut self) -> Result<()> {
        if !self.driver.supports_transactions() {
            return Err(Error::Unsupported(format!(
                "transactions are disabled for the {} driver",
                self.driver.name()
            )));
        }

        if self.in_transaction() {
            tracing::debug!("begin_transaction inside a transaction, ignoring");
            return Ok(());
        }

        if self.handle.is_none() {
            tracing::debug!("begin_transaction on a disconnected connection, connecting");
            self.connect()?;
        }

        let handle = self.handle.as_mut().ok_or(Error::NotConnected {
            operation: "begin_transaction",
        })?;
        let prev = handle.autocommit()?;
        handle.set_autocommit(false)?;

        self.state.transition(ConnectionState::InTransaction)?;
        self.prev_autocommit = Some(prev);
        self.transaction_started = Some(Instant::now());

        crate::metrics::counters::transaction_begun(self.driver.name());
        tracing::debug!(prev_autocommit = prev, "transaction started");
        Ok(())
    }

    /// Commit the open transaction and restore the saved autocommit mode
    pub fn commit(&mut self) -> Result<()> {
        let handle = self.transaction_handle("commit")?;
        handle.commit()?;
        self.finish_transaction(labels::OUTCOME_COMMIT)
    }

    /// Roll back the open transaction and restore the saved autocommit mode
    pub fn rollback(&mut self) -> Result<()> {
        let handle = self.transaction_handle("rollback")?;
        handle.rollback()?;
        self.finish_transaction(labels::OUTCOME_ROLLBACK)
    }

    /// Run a statement through the driver's executor
    pub fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        let handle = self.handle.as_mut().ok_or(Error::NotConnected {
            operation: "execute",
        })?;
        let driver = self.driver.name();
        let span = tracing::debug_span!("execute", driver, sql = %sql);
        let _enter = span.enter();

        if let Some(profiler) = self.profiler.as_mut() {
            profiler.start(sql);
        }
        let start = Instant::now();
        let result = self.driver.executor().run(handle, sql);
        let elapsed = start.elapsed().as_millis() as u64;
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.finish();
        }

        crate::metrics::histograms::query_duration(driver, elapsed);
        match &result {
            Ok(rs) => {
                crate::metrics::counters::query_executed(driver, labels::STATUS_OK);
                tracing::debug!(rows = rs.len(), affected = rs.affected_rows(), "statement done");
            }
            Err(e) => {
                crate::metrics::counters::query_executed(driver, labels::STATUS_ERROR);
                tracing::debug!(error = %e, "statement failed");
            }
        }
        result
    }

    /// Last generated key of this session, or the current value of sequence `name`
    pub fn last_generated_value(&mut self, name: Option<&str>) -> Result<Option<i64>> {
        self.handle
            .as_mut()
            .ok_or(Error::NotConnected {
                operation: "last_generated_value",
            })?
            .last_generated_value(name)
    }

    /// Attach a profiler that sees every `execute`
    pub fn set_profiler(&mut self, profiler: impl Profiler + 'static) {
        self.profiler = Some(Box::new(profiler));
    }

    /// Detach the profiler
    pub fn clear_profiler(&mut self) {
        self.profiler = None;
    }

    fn adopt(&mut self, handle: D::Handle, origin: &'static str) {
        debug_assert!(self.handle.is_none(), "adopting over a live handle");
        self.handle = Some(handle);
        self.state = ConnectionState::Connected;
        crate::metrics::counters::connection_opened(self.driver.name(), origin);
    }

    fn transaction_handle(&mut self, operation: &'static str) -> Result<&mut D::Handle> {
        if !self.in_transaction() {
            return Err(Error::NoActiveTransaction { operation });
        }
        self.handle
            .as_mut()
            .ok_or(Error::NotConnected { operation })
    }

    fn finish_transaction(&mut self, outcome: &'static str) -> Result<()> {
        self.state.transition(ConnectionState::Connected)?;
        self.record_transaction_end(outcome);
        self.transaction_started = None;
        tracing::debug!(outcome, "transaction finished");

        let (Some(handle), Some(prev)) = (self.handle.as_mut(), self.prev_autocommit.take())
        else {
            return Ok(());
        };
        handle.set_autocommit(prev)
    }

    fn record_transaction_end(&self, outcome: &'static str) {
        let driver = self.driver.name();
        crate::metrics::counters::transaction_finished(driver, outcome);
        if let Some(started) = self.transaction_started {
            crate::metrics::histograms::transaction_duration(
                driver,
                outcome,
                started.elapsed().as_millis() as u64,
            );
        }
    }
}

impl<D: Driver> Drop for Connection<D> {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            tracing::warn!(error = %e, "failed to release handle on drop");
        }
    }
}

impl<D: Driver> std::fmt::Debug for Connection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("driver", &self.driver.name())
            .field("database", &self.config.database)
            .field("state", &self.state)
            .field("prev_autocommit", &self.prev_autocommit)
            .finish()
    }
}
