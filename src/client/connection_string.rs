//! Connection string parsing
//!
//! Supports formats:
//! * scheme://[user[:password]@][host][:port][/database][?key=value&...]
//! * sqlite::memory: (private in-memory database)
//! * sqlite:///absolute/path.db and sqlite://relative/path.db

use crate::connection::ConnectionConfig;
use crate::driver::sqlite::MEMORY_DATABASE;
use crate::{Error, Result};
use std::collections::HashMap;

/// Scheme handled by the bundled SQLite driver
pub const SQLITE_SCHEME: &str = "sqlite";

/// Parsed connection info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Scheme (driver selector), lowercased
    pub scheme: String,
    /// Host
    pub host: Option<String>,
    /// Port
    pub port: Option<u16>,
    /// Database name or file path
    pub database: String,
    /// Username
    pub user: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Query string parameters
    pub params: HashMap<String, String>,
}

/// Split `key=value&key2=value2` into a map; later keys win
fn parse_query_params(query_string: &str) -> Result<HashMap<String, String>> {
    let query = query_string.trim_start_matches('?');
    let mut params = HashMap::new();
    if query.is_empty() {
        return Ok(params);
    }

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("query parameter without value: {}", pair)))?;
        if key.is_empty() {
            return Err(Error::Config("query parameter with empty name".into()));
        }
        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}

fn split_query(rest: &str) -> (&str, &str) {
    match rest.find('?') {
        Some(pos) => rest.split_at(pos),
        None => (rest, ""),
    }
}

impl ConnectionInfo {
    /// Parse connection string
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix("sqlite::memory:") {
            return Ok(Self::sqlite(MEMORY_DATABASE.to_string(), parse_query_params(rest)?));
        }

        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| Error::Config("connection string must look like scheme://...".into()))?;
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+') {
            return Err(Error::Config(format!("invalid scheme: {:?}", scheme)));
        }
        let scheme = scheme.to_ascii_lowercase();

        if scheme == SQLITE_SCHEME {
            return Self::parse_sqlite(rest);
        }
        Self::parse_network(scheme, rest)
    }

    fn sqlite(database: String, params: HashMap<String, String>) -> Self {
        Self {
            scheme: SQLITE_SCHEME.to_string(),
            host: None,
            port: None,
            database,
            user: None,
            password: None,
            params,
        }
    }

    fn parse_sqlite(rest: &str) -> Result<Self> {
        // Format: sqlite:///abs/path, sqlite://rel/path, sqlite://:memory:
        let (path, query_string) = split_query(rest);
        if path.is_empty() {
            return Err(Error::Config("sqlite connection string without a path".into()));
        }
        Ok(Self::sqlite(path.to_string(), parse_query_params(query_string)?))
    }

    fn parse_network(scheme: String, rest: &str) -> Result<Self> {
        // Format: [user[:password]@]host[:port][/database][?params]
        let (auth, rest) = match rest.rfind('@') {
            Some(pos) => (Some(&rest[..pos]), &rest[pos + 1..]),
            None => (None, rest),
        };

        let (user, password) = match auth {
            Some(auth) => match auth.split_once(':') {
                Some((user, pass)) => (user.to_string(), Some(pass.to_string())),
                None => (auth.to_string(), None),
            },
            None => (whoami::username(), None),
        };

        let (rest, query_string) = split_query(rest);

        let (host_port, database) = match rest.split_once('/') {
            Some((hp, db)) if !db.is_empty() => (hp, db.to_string()),
            Some((hp, _)) => (hp, user.clone()),
            None => (rest, user.clone()),
        };

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| Error::Config(format!("invalid port: {}", port)))?;
                (host.to_string(), Some(port))
            }
            None => (host_port.to_string(), None),
        };
        if host.is_empty() {
            return Err(Error::Config("connection string without a host".into()));
        }

        Ok(Self {
            scheme,
            host: Some(host),
            port,
            database,
            user: Some(user),
            password,
            params: parse_query_params(query_string)?,
        })
    }

    /// True for `sqlite:` connection strings
    pub fn is_sqlite(&self) -> bool {
        self.scheme == SQLITE_SCHEME
    }

    /// Convert to ConnectionConfig.
    ///
    /// Query parameters go through `ConnectionConfig::from_params`, so keys
    /// such as `connect_timeout` or `persistent` land in their typed fields.
    pub fn to_config(&self) -> Result<ConnectionConfig> {
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.push(("database".into(), self.database.clone()));
        if let Some(user) = &self.user {
            pairs.push(("username".into(), user.clone()));
        }
        if let Some(password) = &self.password {
            pairs.push(("password".into(), password.clone()));
        }
        if let Some(host) = &self.host {
            pairs.push(("host".into(), host.clone()));
        }
        if let Some(port) = self.port {
            pairs.push(("port".into(), port.to_string()));
        }
        ConnectionConfig::from_params(pairs)
    }
}
