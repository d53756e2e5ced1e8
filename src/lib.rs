//! table-loader: infer a table from a CSV or Excel file, create it in MySQL
//! or PostgreSQL and batch-insert the rows.

pub mod config;
pub mod dataset;
pub mod db;
pub mod dialect;
pub mod error;
pub mod ingestion;
pub mod schema;
pub mod upload;

pub use config::ConnectionConfig;
pub use dataset::{Cell, Column, LogicalType, TabularDataset};
pub use db::{open_connection, test_connection, InsertPlan};
pub use dialect::{Dialect, SqlDialect};
pub use error::{Result, UploadError};
pub use ingestion::read_dataset;
pub use schema::{sanitize_identifier, SqlType, TableSchema};
pub use upload::{upload_dataset, upload_file, UploadResult, UploadStage};
