//! Connection configuration

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Connection configuration
///
/// Stores the parameters a driver needs to open a session. Use
/// `ConnectionConfig::builder()` for the less common options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    /// Database name (or file path for embedded engines)
    #[serde(alias = "db", alias = "dbname")]
    pub database: String,
    /// Username
    #[serde(default, alias = "user", alias = "uid")]
    pub username: Option<String>,
    /// Password
    #[serde(default, alias = "pwd")]
    pub password: Option<String>,
    /// Server host
    #[serde(default, alias = "hostname")]
    pub host: Option<String>,
    /// Server port
    #[serde(default)]
    pub port: Option<u16>,
    /// Ask the driver for a persistent (reusable) session.
    ///
    /// A hint: drivers without persistent sessions (SQLite) ignore it.
    #[serde(default)]
    pub persistent: bool,
    /// Application name reported to the server.
    ///
    /// A hint: drivers without a server to report to (SQLite) ignore it.
    #[serde(default)]
    pub application_name: Option<String>,
    /// Upper bound the driver may wait while opening the session
    #[serde(skip)]
    pub connect_timeout: Option<Duration>,
    /// Driver-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Create new configuration with defaults
    ///
    /// # Arguments
    ///
    /// * `database` - Database name
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            username: None,
            password: None,
            host: None,
            port: None,
            persistent: false,
            application_name: None,
            connect_timeout: None,
            params: HashMap::new(),
        }
    }

    /// Create a builder for advanced configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use db_adapter::connection::ConnectionConfig;
    /// use std::time::Duration;
    ///
    /// let config = ConnectionConfig::builder("SAMPLE")
    ///     .username("db2inst1")
    ///     .password("secret")
    ///     .connect_timeout(Duration::from_secs(10))
    ///     .persistent(true)
    ///     .build();
    /// assert!(config.persistent);
    /// ```
    pub fn builder(database: impl Into<String>) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder {
            config: Self::new(database),
        }
    }

    /// Build from a key/value mapping.
    ///
    /// Recognized keys (ASCII case-insensitive): `database` (`db`, `dbname`),
    /// `username` (`user`, `uid`), `password` (`pwd`), `host` (`hostname`),
    /// `port`, `persistent`, `application_name`, `connect_timeout` (seconds).
    /// Every other key is kept in `params` and otherwise ignored.
    pub fn from_params<I, K, V>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut database = None;
        let mut config = Self::new(String::new());

        for (key, value) in params {
            let key = key.as_ref();
            let value = value.into();
            match key.to_ascii_lowercase().as_str() {
                "database" | "db" | "dbname" => database = Some(value),
                "username" | "user" | "uid" => config.username = Some(value),
                "password" | "pwd" => config.password = Some(value),
                "host" | "hostname" => config.host = Some(value),
                "port" => {
                    let port = value
                        .parse()
                        .map_err(|_| Error::Config(format!("invalid port: {}", value)))?;
                    config.port = Some(port);
                }
                "persistent" => config.persistent = parse_flag(&value)?,
                "application_name" => config.application_name = Some(value),
                "connect_timeout" => {
                    let secs: u64 = value
                        .parse()
                        .map_err(|_| Error::Config(format!("invalid connect_timeout: {}", value)))?;
                    config.connect_timeout = Some(Duration::from_secs(secs));
                }
                _ => {
                    config.params.insert(key.to_string(), value);
                }
            }
        }

        config.database = database
            .filter(|db| !db.is_empty())
            .ok_or_else(|| Error::Config("missing database parameter".into()))?;
        Ok(config)
    }

    /// Set username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Add connection parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!("invalid boolean: {}", other))),
    }
}

/// Builder for creating `ConnectionConfig` with advanced options
#[derive(Debug, Clone)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// Set the username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    /// Set the password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Set the server host and port
    pub fn host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.host = Some(host.into());
        self.config.port = Some(port);
        self
    }

    /// Add a connection parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.params.insert(key.into(), value.into());
        self
    }

    /// Set the time the driver may spend opening the session
    ///
    /// Default: None (driver default)
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.config.connect_timeout = Some(duration);
        self
    }

    /// Request a persistent session
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.config.persistent = persistent;
        self
    }

    /// Set application name
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.config.application_name = Some(name.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config() {
        let config = ConnectionConfig::new("testdb")
            .username("testuser")
            .password("testpass")
            .param("currentschema", "APP");

        assert_eq!(config.database, "testdb");
        assert_eq!(config.username, Some("testuser".to_string()));
        assert_eq!(config.password, Some("testpass".to_string()));
        assert_eq!(config.params.get("currentschema"), Some(&"APP".to_string()));
    }

    #[test]
    fn test_connection_config_defaults() {
        let config = ConnectionConfig::new("db");

        assert!(config.username.is_none());
        assert!(config.password.is_none());
        assert!(config.connect_timeout.is_none());
        assert!(!config.persistent);
        assert!(config.params.is_empty());
    }

    #[test]
    fn test_connection_config_builder_fluent() {
        let config = ConnectionConfig::builder("mydb")
            .username("myuser")
            .password("secret")
            .host("db.internal", 50000)
            .param("key1", "value1")
            .connect_timeout(Duration::from_secs(5))
            .application_name("test_app")
            .build();

        assert_eq!(config.database, "mydb");
        assert_eq!(config.host.as_deref(), Some("db.internal"));
        assert_eq!(config.port, Some(50000));
        assert_eq!(config.params.get("key1"), Some(&"value1".to_string()));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.application_name, Some("test_app".to_string()));
    }

    #[test]
    fn test_from_params_aliases() {
        let config = ConnectionConfig::from_params([
            ("db", "SAMPLE"),
            ("UID", "db2inst1"),
            ("PWD", "secret"),
            ("hostname", "localhost"),
            ("port", "50000"),
            ("persistent", "true"),
        ])
        .unwrap();

        assert_eq!(config.database, "SAMPLE");
        assert_eq!(config.username.as_deref(), Some("db2inst1"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.host.as_deref(), Some("localhost"));
        assert_eq!(config.port, Some(50000));
        assert!(config.persistent);
    }

    #[test]
    fn test_from_params_keeps_unknown_keys_aside() {
        let config =
            ConnectionConfig::from_params([("database", "x"), ("charset", "utf8")]).unwrap();
        assert_eq!(config.params.get("charset"), Some(&"utf8".to_string()));
        assert!(config.username.is_none());
    }

    #[test]
    fn test_from_params_requires_database() {
        let err = ConnectionConfig::from_params([("username", "u")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ConnectionConfig::from_params([("database", "")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_params_invalid_values() {
        assert!(ConnectionConfig::from_params([("database", "x"), ("port", "high")]).is_err());
        assert!(ConnectionConfig::from_params([("database", "x"), ("persistent", "maybe")]).is_err());
    }

    #[test]
    fn test_deserialize_with_aliases() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"dbname": "SAMPLE", "user": "u", "port": 50000, "unknown": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(config.database, "SAMPLE");
        assert_eq!(config.username.as_deref(), Some("u"));
        assert_eq!(config.port, Some(50000));
        assert!(config.params.is_empty());
    }
}
