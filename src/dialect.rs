//! SQL dialect adapters - the syntax that differs between the supported backends

use crate::error::{Result, UploadError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dialect-specific syntax used by the schema builder and the batch loader.
pub trait SqlDialect: Send + Sync {
    /// Upper-case display name, e.g. "MYSQL".
    fn name(&self) -> &'static str;

    /// Render an (already sanitized) identifier for use in SQL text.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Full definition of the synthetic autoincrement `id` column.
    fn primary_key_column(&self) -> &'static str;

    /// Bind placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    fn default_port(&self) -> u16;
}

pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "MYSQL"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn primary_key_column(&self) -> &'static str {
        "id INT AUTO_INCREMENT PRIMARY KEY"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn default_port(&self) -> u16 {
        3306
    }
}

pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "POSTGRES"
    }

    // Unquoted: Postgres folds these to lower case.
    fn quote_identifier(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn primary_key_column(&self) -> &'static str {
        "id SERIAL PRIMARY KEY"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn default_port(&self) -> u16 {
        5432
    }
}

/// Dialect tag carried by [`crate::config::ConnectionConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Postgres,
}

impl Dialect {
    pub fn adapter(self) -> &'static dyn SqlDialect {
        match self {
            Dialect::MySql => &MySqlDialect,
            Dialect::Postgres => &PostgresDialect,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.adapter().name())
    }
}

impl FromStr for Dialect {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(UploadError::Config(format!(
                "unsupported dialect '{}' (expected mysql or postgres)",
                other
            ))),
        }
    }
}
