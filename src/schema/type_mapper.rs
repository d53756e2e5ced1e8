//! Maps inferred column types to target SQL column types

use crate::dataset::LogicalType;
use std::fmt;

/// Column types emitted in generated DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    BigInt,
    Float,
    Timestamp,
    Boolean,
    Varchar255,
}

impl SqlType {
    pub fn from_logical(logical: LogicalType) -> SqlType {
        match logical {
            LogicalType::Integer => SqlType::BigInt,
            LogicalType::Float => SqlType::Float,
            LogicalType::Timestamp => SqlType::Timestamp,
            LogicalType::Boolean => SqlType::Boolean,
            _ => SqlType::Varchar255,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Varchar255 => "VARCHAR(255)",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
