//! Database module for MySQL and PostgreSQL connections and bulk loading
//! 
//! One connection per upload attempt; no pooling, no reuse between the
//! connection probe and the working session.

pub mod connection;
pub mod loader;

pub use connection::{open_connection, test_connection, DbConnection};
pub use loader::{load_rows, InsertPlan, InsertStatement};

/// Message reported to the caller for a driver error.
///
/// Errors raised by the server carry the server's own text; everything else
/// (I/O, TLS, protocol) uses the driver's description.
pub(crate) fn driver_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}
