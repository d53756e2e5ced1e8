//! Connection settings supplied by the caller for each upload

use crate::dialect::Dialect;
use crate::error::{Result, UploadError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Credentials and target for one database. Owned by the caller and passed
/// into every core call; nothing here is cached or persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub dialect: Dialect,
    pub host: String,
    pub user: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl ConnectionConfig {
    pub fn new(
        dialect: Dialect,
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            dialect,
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            port,
        }
    }

    /// Load from `DB_DIALECT`, `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
    /// and `DB_PORT`. Host defaults to localhost and port to the dialect's
    /// standard port.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve each key through `lookup`; used by the CLI to layer flags over env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| UploadError::Config(format!("{} is not set", key)))
        };

        let dialect: Dialect = required("DB_DIALECT")?.parse()?;
        let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
        let user = required("DB_USER")?;
        let password = lookup("DB_PASSWORD").unwrap_or_default();
        let database = required("DB_NAME")?;
        let port = match lookup("DB_PORT") {
            Some(raw) => parse_port(&raw)?,
            None => dialect.adapter().default_port(),
        };

        Ok(Self {
            dialect,
            host,
            user,
            password,
            database,
            port,
        })
    }
}

pub fn parse_port(raw: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| UploadError::Config(format!("invalid port '{}'", raw)))
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}
