//! Schema Builder - derives the target table from a dataset and renders its DDL

use crate::dataset::TabularDataset;
use crate::dialect::SqlDialect;
use crate::error::{Result, UploadError};
use crate::schema::sanitize::sanitize_identifier;
use crate::schema::type_mapper::SqlType;
use std::collections::HashMap;

/// Audit column appended to every created table.
pub const UPLOAD_TIMESTAMP_COLUMN: &str = "upload_timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP";

/// A sanitized column name paired with its SQL type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub sql_type: SqlType,
}

/// Target table derived once per upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Sanitize the table and column names and map every column type.
    ///
    /// Rejects a dataset without columns, and columns whose names collide
    /// once sanitized, before anything reaches the database.
    pub fn from_dataset(dataset: &TabularDataset, raw_table_name: &str) -> Result<Self> {
        if dataset.width() == 0 {
            return Err(UploadError::Input("dataset has no columns".to_string()));
        }

        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut columns = Vec::with_capacity(dataset.width());

        for column in dataset.columns() {
            let name = sanitize_identifier(column.name());
            if let Some(previous) = seen.insert(name.clone(), column.name()) {
                return Err(UploadError::Input(format!(
                    "columns '{}' and '{}' both sanitize to '{}'",
                    previous,
                    column.name(),
                    name
                )));
            }
            columns.push(ColumnSchema {
                name,
                sql_type: SqlType::from_logical(column.logical_type()),
            });
        }

        Ok(Self {
            table_name: sanitize_identifier(raw_table_name),
            columns,
        })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `CREATE TABLE IF NOT EXISTS` with the synthetic key first, the dataset
    /// columns in order (all nullable) and the upload timestamp last.
    pub fn create_table_sql(&self, dialect: &dyn SqlDialect) -> String {
        let mut parts = Vec::with_capacity(self.columns.len() + 2);
        parts.push(dialect.primary_key_column().to_string());
        for column in &self.columns {
            parts.push(format!(
                "{} {}",
                dialect.quote_identifier(&column.name),
                column.sql_type
            ));
        }
        parts.push(UPLOAD_TIMESTAMP_COLUMN.to_string());

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            dialect.quote_identifier(&self.table_name),
            parts.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Cell, Column};
    use crate::dialect::Dialect;

    fn people() -> TabularDataset {
        TabularDataset::new(vec![
            Column::new("id", vec![Cell::Integer(1)]),
            Column::new("name", vec![Cell::Text("Alice".to_string())]),
            Column::new("age", vec![Cell::Integer(30)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_mysql_ddl() {
        let schema = TableSchema::from_dataset(&people(), "people").unwrap();
        let ddl = schema.create_table_sql(Dialect::MySql.adapter());
        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS `people` (id INT AUTO_INCREMENT PRIMARY KEY, \
             `id` BIGINT, `name` VARCHAR(255), `age` BIGINT, \
             upload_timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP)"
        );
    }

    #[test]
    fn test_postgres_ddl() {
        let schema = TableSchema::from_dataset(&people(), "people").unwrap();
        let ddl = schema.create_table_sql(Dialect::Postgres.adapter());
        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS people (id SERIAL PRIMARY KEY, \
             id BIGINT, name VARCHAR(255), age BIGINT, \
             upload_timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP)"
        );
    }

    #[test]
    fn test_dialects_differ_only_in_quoting_and_key() {
        let ds = TabularDataset::new(vec![
            Column::new("Order Date", vec![Cell::from_raw("2024-01-01")]),
            Column::new("qty", vec![Cell::Integer(2)]),
            Column::new("price", vec![Cell::Float(9.5)]),
            Column::new("paid?", vec![Cell::Boolean(true)]),
            Column::new("note", vec![Cell::Null]),
        ])
        .unwrap();
        let schema = TableSchema::from_dataset(&ds, "sales 2024").unwrap();

        let mysql = schema
            .create_table_sql(Dialect::MySql.adapter())
            .replace('`', "")
            .replace("id INT AUTO_INCREMENT PRIMARY KEY", "<pk>");
        let postgres = schema
            .create_table_sql(Dialect::Postgres.adapter())
            .replace("id SERIAL PRIMARY KEY", "<pk>");

        assert_eq!(mysql, postgres);
        assert!(postgres.contains("sales2024"));
        assert!(postgres.contains(
            "OrderDate TIMESTAMP, qty BIGINT, price FLOAT, paid BOOLEAN, note VARCHAR(255)"
        ));
        assert!(!postgres.contains("NOT NULL"));
    }

    #[test]
    fn test_sanitized_collision_rejected() {
        let ds = TabularDataset::new(vec![
            Column::new("unit price", vec![Cell::Integer(1)]),
            Column::new("unit-price", vec![Cell::Integer(2)]),
        ])
        .unwrap();
        let err = TableSchema::from_dataset(&ds, "t").unwrap_err();
        assert!(matches!(err, UploadError::Input(_)));
        assert!(err.to_string().contains("unitprice"));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let ds = TabularDataset::new(vec![]).unwrap();
        assert!(matches!(
            TableSchema::from_dataset(&ds, "t"),
            Err(UploadError::Input(_))
        ));
    }
}
