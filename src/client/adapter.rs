//! Adapter implementation

use super::connection_string::ConnectionInfo;
use crate::connection::{Connection, ConnectionConfig};
use crate::driver::sqlite::SqliteDriver;
use crate::driver::Driver;
use crate::{Error, Result, ResultSet};

/// Driver plus the connection it serves
///
/// Unlike `Connection`, which fails fast when no handle is open, the adapter
/// opens the connection on first use.
#[derive(Debug)]
pub struct Adapter<D: Driver> {
    conn: Connection<D>,
}

impl Adapter<SqliteDriver> {
    /// Open a SQLite database from a connection string
    ///
    /// # Examples
    ///
    /// ```
    /// # fn example() -> db_adapter::Result<()> {
    /// use db_adapter::Adapter;
    ///
    /// let mut adapter = Adapter::connect("sqlite::memory:")?;
    /// let result = adapter.execute("SELECT 'foo'")?;
    /// assert_eq!(result.first_value().and_then(|v| v.as_str()), Some("foo"));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn connect(connection_string: &str) -> Result<Self> {
        let info = ConnectionInfo::parse(connection_string)?;
        if !info.is_sqlite() {
            return Err(Error::Config(format!(
                "no bundled driver for scheme {:?}",
                info.scheme
            )));
        }

        let mut adapter = Self::new(SqliteDriver::new(), info.to_config()?);
        adapter.conn.connect()?;
        Ok(adapter)
    }
}

impl<D: Driver> Adapter<D> {
    /// Create an adapter without connecting
    pub fn new(driver: D, config: ConnectionConfig) -> Self {
        Self {
            conn: Connection::new(driver, config),
        }
    }

    /// Create an adapter for `driver` from a connection string, without connecting
    pub fn with_connection_string(driver: D, connection_string: &str) -> Result<Self> {
        let config = ConnectionInfo::parse(connection_string)?.to_config()?;
        Ok(Self::new(driver, config))
    }

    /// Borrow the connection
    pub fn connection(&self) -> &Connection<D> {
        &self.conn
    }

    /// Borrow the connection mutably
    pub fn connection_mut(&mut self) -> &mut Connection<D> {
        &mut self.conn
    }

    /// Take the connection out of the adapter
    pub fn into_connection(self) -> Connection<D> {
        self.conn
    }

    /// Run a statement, connecting first if needed
    pub fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        self.conn.connect()?.execute(sql)
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err` or when
    /// the commit itself fails. A rollback failure is logged and the original
    /// error is returned.
    pub fn transaction<F, R>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Connection<D>) -> Result<R>,
    {
        self.conn.begin_transaction()?;
        let outcome = f(&mut self.conn).and_then(|value| {
            self.conn.commit()?;
            Ok(value)
        });
        if let Err(e) = &outcome {
            if self.conn.in_transaction() {
                tracing::debug!(error = %e, "rolling back transaction");
                if let Err(rollback_err) = self.conn.rollback() {
                    tracing::warn!(error = %rollback_err, "rollback after failed transaction failed");
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connect_memory() {
        let adapter = Adapter::connect("sqlite::memory:").unwrap();
        assert!(adapter.connection().is_connected());
    }

    #[test]
    fn test_connect_rejects_unknown_scheme() {
        let err = Adapter::connect("db2://localhost/SAMPLE").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_execute_connects_lazily() {
        let mut adapter = Adapter::with_connection_string(SqliteDriver::new(), "sqlite::memory:")
            .unwrap();
        assert!(!adapter.connection().is_connected());

        let rs = adapter.execute("SELECT 'foo'").unwrap();
        assert_eq!(rs.first_value(), Some(&json!("foo")));
        assert!(adapter.connection().is_connected());
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let mut adapter = Adapter::connect("sqlite::memory:").unwrap();
        adapter.execute("CREATE TABLE t (v TEXT)").unwrap();

        let inserted = adapter
            .transaction(|conn| conn.execute("INSERT INTO t VALUES ('a')"))
            .unwrap();
        assert_eq!(inserted.affected_rows(), 1);
        assert!(!adapter.connection().in_transaction());

        let rs = adapter.execute("SELECT count(*) FROM t").unwrap();
        assert_eq!(rs.first_value(), Some(&json!(1)));
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let mut adapter = Adapter::connect("sqlite::memory:").unwrap();
        adapter.execute("CREATE TABLE t (v TEXT)").unwrap();

        let result: Result<()> = adapter.transaction(|conn| {
            conn.execute("INSERT INTO t VALUES ('a')")?;
            conn.execute("INSERT INTO missing VALUES ('b')")?;
            Ok(())
        });
        assert!(matches!(result, Err(Error::Query(_))));
        assert!(!adapter.connection().in_transaction());

        let rs = adapter.execute("SELECT count(*) FROM t").unwrap();
        assert_eq!(rs.first_value(), Some(&json!(0)));
    }

    #[test]
    fn test_transaction_rolls_back_when_commit_fails() {
        let mut adapter = Adapter::connect("sqlite::memory:?pragma.foreign_keys=ON").unwrap();
        adapter
            .execute("CREATE TABLE parent (id INTEGER PRIMARY KEY)")
            .unwrap();
        adapter
            .execute(
                "CREATE TABLE child (pid INTEGER REFERENCES parent(id) \
                 DEFERRABLE INITIALLY DEFERRED)",
            )
            .unwrap();

        // The deferred foreign key is only checked at COMMIT
        let result = adapter.transaction(|conn| conn.execute("INSERT INTO child VALUES (42)"));
        assert!(matches!(result, Err(Error::Driver(_))));
        assert!(!adapter.connection().in_transaction());

        let rs = adapter.execute("SELECT count(*) FROM child").unwrap();
        assert_eq!(rs.first_value(), Some(&json!(0)));
    }
}
