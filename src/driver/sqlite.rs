//! SQLite driver backed by rusqlite
//!
//! SQLite has no autocommit switch of its own: a session is in autocommit mode
//! whenever no `BEGIN` is open. `SqliteSession` emulates the switch by keeping
//! a transaction open while autocommit is off and opening the next one right
//! after every commit or rollback.

use super::{Driver, Session, StatementExecutor};
use crate::connection::ConnectionConfig;
use crate::{Error, Result, ResultSet};
use rusqlite::types::ValueRef;
use rusqlite::{OpenFlags, OptionalExtension};
use serde_json::Value;

/// Database name that opens a private in-memory database
pub const MEMORY_DATABASE: &str = ":memory:";

/// Prefix of connection parameters applied as `PRAGMA` statements on open
pub const PRAGMA_PARAM_PREFIX: &str = "pragma.";

/// SQLite driver
#[derive(Debug, Clone)]
pub struct SqliteDriver {
    executor: SqliteExecutor,
    transactions_enabled: bool,
}

impl SqliteDriver {
    /// Create a driver with transactions enabled
    pub fn new() -> Self {
        Self {
            executor: SqliteExecutor,
            transactions_enabled: true,
        }
    }

    /// Override the transaction capability flag
    ///
    /// Lets a deployment that forbids explicit transactions say so up front;
    /// `begin_transaction` then fails with `Error::Unsupported`.
    pub fn with_transactions(mut self, enabled: bool) -> Self {
        self.transactions_enabled = enabled;
        self
    }

    fn open(config: &ConnectionConfig) -> rusqlite::Result<rusqlite::Connection> {
        if config.database == MEMORY_DATABASE {
            return rusqlite::Connection::open_in_memory();
        }

        let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if config.params.get("mode").map(String::as_str) == Some("ro") {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        }
        rusqlite::Connection::open_with_flags(&config.database, flags)
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for SqliteDriver {
    type Handle = SqliteSession;
    type Executor = SqliteExecutor;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn create(&self, config: &ConnectionConfig) -> Result<SqliteSession> {
        if config.username.is_some() || config.password.is_some() {
            tracing::debug!("sqlite ignores username/password");
        }
        if config.persistent || config.application_name.is_some() {
            tracing::debug!("sqlite ignores persistent/application_name");
        }

        let conn = Self::open(config).map_err(|e| Error::Connection(e.to_string()))?;

        if let Some(timeout) = config.connect_timeout {
            conn.busy_timeout(timeout)
                .map_err(|e| Error::Connection(e.to_string()))?;
        }

        for (key, value) in &config.params {
            let Some(pragma) = key.strip_prefix(PRAGMA_PARAM_PREFIX) else {
                continue;
            };
            if !is_identifier(pragma) {
                return Err(Error::Connection(format!("invalid pragma name: {}", pragma)));
            }
            if !is_pragma_value(value) {
                return Err(Error::Connection(format!(
                    "invalid value for PRAGMA {}: {:?}",
                    pragma, value
                )));
            }
            // Some pragmas echo their new value as a row; execute_batch discards it
            conn.execute_batch(&format!("PRAGMA {} = {}", pragma, value))
                .map_err(|e| Error::Connection(format!("PRAGMA {}: {}", pragma, e)))?;
            tracing::debug!("applied PRAGMA {} = {}", pragma, value);
        }

        Ok(SqliteSession::new(conn))
    }

    fn destroy(&self, handle: SqliteSession) -> Result<()> {
        handle
            .conn
            .close()
            .map_err(|(_conn, e)| Error::Driver(format!("close failed: {}", e)))
    }

    fn executor(&self) -> &SqliteExecutor {
        &self.executor
    }

    fn supports_transactions(&self) -> bool {
        self.transactions_enabled
    }
}

/// Open SQLite session
#[derive(Debug)]
pub struct SqliteSession {
    conn: rusqlite::Connection,
    autocommit: bool,
}

impl SqliteSession {
    /// Wrap an already opened rusqlite connection
    pub fn new(conn: rusqlite::Connection) -> Self {
        let autocommit = conn.is_autocommit();
        Self { conn, autocommit }
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        rusqlite::Connection::open_in_memory()
            .map(Self::new)
            .map_err(|e| Error::Connection(e.to_string()))
    }

    /// Underlying rusqlite connection
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// True while SQLite has a `BEGIN` open
    pub fn has_open_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::Driver(format!("{}: {}", sql, e)))
    }

    /// Reopen the emulated transaction if SQLite ended it on its own.
    ///
    /// `INSERT OR ROLLBACK`, a literal `COMMIT`/`ROLLBACK` or an I/O error can
    /// close the `BEGIN` behind our back while autocommit is still off.
    fn resume_transaction(&mut self) -> Result<()> {
        if !self.autocommit && !self.has_open_transaction() {
            tracing::warn!("sqlite ended the open transaction, starting a new one");
            self.batch("BEGIN")?;
        }
        Ok(())
    }
}

impl Session for SqliteSession {
    fn autocommit(&self) -> Result<bool> {
        Ok(self.autocommit)
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            if self.has_open_transaction() {
                self.batch("COMMIT")?;
            }
        } else if !self.has_open_transaction() {
            self.batch("BEGIN")?;
        }
        self.autocommit = enabled;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.has_open_transaction() {
            self.batch("COMMIT")?;
        }
        if !self.autocommit {
            self.batch("BEGIN")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.has_open_transaction() {
            self.batch("ROLLBACK")?;
        }
        if !self.autocommit {
            self.batch("BEGIN")?;
        }
        Ok(())
    }

    fn current_schema(&self) -> Result<String> {
        self.conn
            .query_row(
                "SELECT name FROM pragma_database_list WHERE seq = 0",
                [],
                |row| row.get::<_, String>(0),
            )
            .map_err(|e| Error::Driver(format!("schema lookup failed: {}", e)))
    }

    fn last_generated_value(&mut self, name: Option<&str>) -> Result<Option<i64>> {
        let Some(name) = name else {
            let id = self.conn.last_insert_rowid();
            return Ok((id != 0).then_some(id));
        };

        // sqlite_sequence only exists once an AUTOINCREMENT table was created
        let has_sequences: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE name = 'sqlite_sequence')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::Driver(e.to_string()))?;
        if !has_sequences {
            return Ok(None);
        }

        self.conn
            .query_row(
                "SELECT seq FROM sqlite_sequence WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Driver(e.to_string()))
    }
}

/// Executor that materializes every row into a `ResultSet`
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteExecutor;

impl StatementExecutor<SqliteSession> for SqliteExecutor {
    fn run(&self, handle: &mut SqliteSession, sql: &str) -> Result<ResultSet> {
        handle.resume_transaction()?;
        let result = run_statement(&handle.conn, sql);
        // Keep autocommit-off sessions inside a transaction even after a failed statement
        let resumed = handle.resume_transaction();
        let rs = result?;
        resumed?;
        Ok(rs)
    }
}

fn run_statement(conn: &rusqlite::Connection, sql: &str) -> Result<ResultSet> {
    let mut stmt = conn.prepare(sql).map_err(query_error)?;

    if stmt.column_count() == 0 {
        let affected = stmt.execute([]).map_err(query_error)?;
        return Ok(ResultSet::with_affected_rows(affected as u64));
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = stmt.query([]).map_err(query_error)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(query_error)? {
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            values.push(to_json(row.get_ref(idx).map_err(query_error)?));
        }
        out.push(values);
    }

    Ok(ResultSet::with_rows(columns, out))
}

fn query_error(e: rusqlite::Error) -> Error {
    Error::Query(e.to_string())
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Pragma values come from connection strings: a signed integer, a bare
/// keyword, or a single-quoted literal without quotes or `;` inside
fn is_pragma_value(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if is_identifier(s) {
        return true;
    }
    match s.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
        Some(inner) => !inner.contains(['\'', ';']),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> SqliteSession {
        SqliteSession::open_in_memory().unwrap()
    }

    #[test]
    fn test_new_session_is_autocommit() {
        let s = session();
        assert!(s.autocommit().unwrap());
        assert!(!s.has_open_transaction());
    }

    #[test]
    fn test_autocommit_off_keeps_transaction_open() {
        let mut s = session();
        s.set_autocommit(false).unwrap();
        assert!(s.has_open_transaction());

        s.commit().unwrap();
        assert!(s.has_open_transaction(), "next transaction starts after commit");

        s.set_autocommit(true).unwrap();
        assert!(!s.has_open_transaction());
    }

    #[test]
    fn test_current_schema_is_main() {
        assert_eq!(session().current_schema().unwrap(), "main");
    }

    #[test]
    fn test_select_literal() {
        let mut s = session();
        let rs = SqliteExecutor.run(&mut s, "SELECT 'foo' AS v").unwrap();
        assert_eq!(rs.columns(), ["v"]);
        assert_eq!(rs.first_value(), Some(&json!("foo")));
    }

    #[test]
    fn test_value_conversion() {
        let mut s = session();
        let rs = SqliteExecutor
            .run(&mut s, "SELECT 1, 2.5, NULL, 'x', x'0102'")
            .unwrap();
        assert_eq!(
            rs.rows()[0],
            vec![json!(1), json!(2.5), Value::Null, json!("x"), json!([1, 2])]
        );
    }

    #[test]
    fn test_dml_reports_affected_rows() {
        let mut s = session();
        SqliteExecutor
            .run(&mut s, "CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT)")
            .unwrap();
        let rs = SqliteExecutor
            .run(&mut s, "INSERT INTO t (v) VALUES ('a')")
            .unwrap();
        assert_eq!(rs.affected_rows(), 1);
        assert!(!rs.is_query_result());
    }

    #[test]
    fn test_syntax_error_is_query_error() {
        let mut s = session();
        let err = SqliteExecutor.run(&mut s, "SELEC 1").unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn test_last_generated_value() {
        let mut s = session();
        assert_eq!(s.last_generated_value(None).unwrap(), None);
        assert_eq!(s.last_generated_value(Some("t")).unwrap(), None);

        SqliteExecutor
            .run(&mut s, "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, v TEXT)")
            .unwrap();
        SqliteExecutor
            .run(&mut s, "INSERT INTO t (v) VALUES ('a'), ('b')")
            .unwrap();

        assert_eq!(s.last_generated_value(None).unwrap(), Some(2));
        assert_eq!(s.last_generated_value(Some("t")).unwrap(), Some(2));
        assert_eq!(s.last_generated_value(Some("other")).unwrap(), None);
    }

    #[test]
    fn test_create_applies_pragmas() {
        let driver = SqliteDriver::new();
        let config = ConnectionConfig::new(MEMORY_DATABASE).param("pragma.user_version", "7");
        let mut s = driver.create(&config).unwrap();
        let rs = SqliteExecutor.run(&mut s, "PRAGMA user_version").unwrap();
        assert_eq!(rs.first_value(), Some(&json!(7)));
        driver.destroy(s).unwrap();
    }

    #[test]
    fn test_create_ignores_session_hints() {
        let driver = SqliteDriver::new();
        let config = ConnectionConfig::builder(MEMORY_DATABASE)
            .persistent(true)
            .application_name("reporting")
            .build();
        let s = driver.create(&config).unwrap();
        assert!(s.autocommit().unwrap());
        driver.destroy(s).unwrap();
    }

    #[test]
    fn test_create_rejects_bad_pragma_name() {
        let config = ConnectionConfig::new(MEMORY_DATABASE).param("pragma.x; DROP", "1");
        let err = SqliteDriver::new().create(&config).unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_create_rejects_statement_in_pragma_value() {
        let config = ConnectionConfig::new(MEMORY_DATABASE)
            .param("pragma.user_version", "1; CREATE TABLE injected (x)");
        let err = SqliteDriver::new().create(&config).unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_pragma_values() {
        assert!(is_pragma_value("42"));
        assert!(is_pragma_value("-2000"));
        assert!(is_pragma_value("WAL"));
        assert!(is_pragma_value("'utf-8'"));

        assert!(!is_pragma_value(""));
        assert!(!is_pragma_value("-"));
        assert!(!is_pragma_value("1;DROP TABLE victim"));
        assert!(!is_pragma_value("'a';DROP TABLE victim;'"));
        assert!(!is_pragma_value("'unterminated"));
        assert!(!is_pragma_value("ON OFF"));
    }

    #[test]
    fn test_create_missing_read_only_file_fails() {
        let config = ConnectionConfig::new("/nonexistent/dir/db.sqlite").param("mode", "ro");
        let err = SqliteDriver::new().create(&config).unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_transaction_capability_flag() {
        assert!(SqliteDriver::new().supports_transactions());
        assert!(!SqliteDriver::new().with_transactions(false).supports_transactions());
    }
}
