//! Schema derivation - from a parsed dataset to `CREATE TABLE` DDL

pub mod builder;
pub mod sanitize;
pub mod type_mapper;

pub use builder::{ColumnSchema, TableSchema};
pub use sanitize::sanitize_identifier;
pub use type_mapper::SqlType;
