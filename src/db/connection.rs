//! Database connection management using sqlx

use crate::config::ConnectionConfig;
use crate::db::driver_message;
use crate::dialect::Dialect;
use crate::error::{Result, UploadError};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, warn};

/// A single open connection for one of the supported dialects.
pub enum DbConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
}

impl DbConnection {
    pub fn dialect(&self) -> Dialect {
        match self {
            DbConnection::MySql(_) => Dialect::MySql,
            DbConnection::Postgres(_) => Dialect::Postgres,
        }
    }

    /// Run a DDL statement; a rejection is a schema error.
    pub async fn execute_ddl(&mut self, sql: &str) -> Result<()> {
        let outcome = match self {
            DbConnection::MySql(conn) => sqlx::raw_sql(sql).execute(&mut *conn).await.map(|_| ()),
            DbConnection::Postgres(conn) => sqlx::raw_sql(sql).execute(&mut *conn).await.map(|_| ()),
        };
        outcome.map_err(|e| UploadError::Schema(driver_message(&e)))
    }

    /// Gracefully close the connection.
    pub async fn close(self) -> Result<()> {
        let outcome = match self {
            DbConnection::MySql(conn) => conn.close().await,
            DbConnection::Postgres(conn) => conn.close().await,
        };
        outcome.map_err(|e| UploadError::Connectivity(driver_message(&e)))
    }
}

/// Open a connection with the dialect's driver.
///
/// Options are built field by field so credentials never pass through a URL.
pub async fn open_connection(config: &ConnectionConfig) -> Result<DbConnection> {
    debug!(
        dialect = %config.dialect,
        host = %config.host,
        port = config.port,
        database = %config.database,
        "opening connection"
    );

    let connection = match config.dialect {
        Dialect::MySql => MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .connect()
            .await
            .map(DbConnection::MySql),
        Dialect::Postgres => PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .connect()
            .await
            .map(DbConnection::Postgres),
    };

    connection.map_err(|e| UploadError::Connectivity(driver_message(&e)))
}

/// Probe the credentials: open, then close straight away.
///
/// Never fails; any error is logged and reported as unreachable.
pub async fn test_connection(config: &ConnectionConfig) -> bool {
    match open_connection(config).await {
        Ok(conn) => {
            if let Err(e) = conn.close().await {
                warn!("Connection probe opened but failed to close cleanly: {}", e);
            }
            true
        }
        Err(e) => {
            warn!("Connection error: {}", e);
            false
        }
    }
}
