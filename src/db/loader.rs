//! Batch Loader - multi-row parameterized inserts executed as one transaction

use crate::dataset::{Cell, LogicalType, TabularDataset};
use crate::db::connection::DbConnection;
use crate::db::driver_message;
use crate::dialect::SqlDialect;
use crate::error::{Result, UploadError};
use crate::schema::TableSchema;
use chrono::NaiveDateTime;
use sqlx::encode::Encode;
use sqlx::query::Query;
use sqlx::{Connection, Database, Executor, IntoArguments, MySql, Postgres, Type};
use std::ops::Range;
use tracing::debug;

/// Upper bound on bind parameters in one statement, shared by the MySQL and
/// PostgreSQL wire protocols.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// One `INSERT ... VALUES (..), (..)` statement covering a range of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub sql: String,
    pub rows: Range<usize>,
}

/// Every statement needed to insert a dataset. Executed together in a single
/// transaction, so the plan succeeds or fails as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    statements: Vec<InsertStatement>,
    row_count: usize,
    width: usize,
}

impl InsertPlan {
    pub fn new(dialect: &dyn SqlDialect, schema: &TableSchema, row_count: usize) -> Self {
        Self::with_param_limit(dialect, schema, row_count, MAX_BIND_PARAMS)
    }

    pub(crate) fn with_param_limit(
        dialect: &dyn SqlDialect,
        schema: &TableSchema,
        row_count: usize,
        max_params: usize,
    ) -> Self {
        let width = schema.columns.len();
        let rows_per_statement = (max_params / width.max(1)).max(1);

        let mut statements = Vec::new();
        let mut start = 0;
        while start < row_count {
            let end = (start + rows_per_statement).min(row_count);
            statements.push(InsertStatement {
                sql: insert_sql(dialect, schema, end - start),
                rows: start..end,
            });
            start = end;
        }

        Self {
            statements,
            row_count,
            width,
        }
    }

    pub fn statements(&self) -> &[InsertStatement] {
        &self.statements
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Bind parameters per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The plan must have been built for a dataset of exactly this shape.
    fn check_shape(&self, dataset: &TabularDataset) -> Result<()> {
        if self.row_count != dataset.row_count() || self.width != dataset.width() {
            return Err(UploadError::Input(format!(
                "insert plan covers {} rows x {} columns, dataset has {} x {}",
                self.row_count,
                self.width,
                dataset.row_count(),
                dataset.width()
            )));
        }
        Ok(())
    }
}

fn insert_sql(dialect: &dyn SqlDialect, schema: &TableSchema, rows: usize) -> String {
    let width = schema.columns.len();
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| dialect.quote_identifier(&c.name))
        .collect();

    let mut param = 0;
    let groups: Vec<String> = (0..rows)
        .map(|_| {
            let placeholders: Vec<String> = (0..width)
                .map(|_| {
                    param += 1;
                    dialect.placeholder(param)
                })
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        dialect.quote_identifier(&schema.table_name),
        columns.join(", "),
        groups.join(", ")
    )
}

/// Insert every row of `dataset` and commit once.
///
/// Returns the number of rows submitted. Any failure rolls the whole batch
/// back and is reported with the driver's message; no partial count exists.
pub async fn load_rows(
    conn: &mut DbConnection,
    plan: &InsertPlan,
    dataset: &TabularDataset,
) -> Result<u64> {
    plan.check_shape(dataset)?;
    if plan.row_count() == 0 {
        return Ok(0);
    }

    let outcome = match conn {
        DbConnection::MySql(c) => run_batch::<MySql>(c, plan, dataset).await,
        DbConnection::Postgres(c) => run_batch::<Postgres>(c, plan, dataset).await,
    };
    outcome.map_err(|e| UploadError::Data(driver_message(&e)))
}

async fn run_batch<DB>(
    conn: &mut DB::Connection,
    plan: &InsertPlan,
    dataset: &TabularDataset,
) -> std::result::Result<u64, sqlx::Error>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> <DB as Database>::Arguments<'q>: IntoArguments<'q, DB>,
    for<'q> Option<i64>: Encode<'q, DB>,
    for<'q> Option<f64>: Encode<'q, DB>,
    for<'q> Option<bool>: Encode<'q, DB>,
    for<'q> Option<NaiveDateTime>: Encode<'q, DB>,
    for<'q> Option<String>: Encode<'q, DB>,
    Option<i64>: Type<DB>,
    Option<f64>: Type<DB>,
    Option<bool>: Type<DB>,
    Option<NaiveDateTime>: Type<DB>,
    Option<String>: Type<DB>,
{
    // Dropping the transaction without commit rolls it back.
    let mut tx = conn.begin().await?;

    for statement in plan.statements() {
        let mut query = sqlx::query::<DB>(&statement.sql);
        for row in statement.rows.clone() {
            for (idx, column) in dataset.columns().iter().enumerate() {
                query = bind_cell(query, column.logical_type(), dataset.cell(row, idx));
            }
        }
        query.execute(&mut *tx).await?;
        debug!(
            rows = statement.rows.len(),
            first_row = statement.rows.start,
            "insert statement executed"
        );
    }

    tx.commit().await?;
    Ok(plan.row_count() as u64)
}

/// Bind one cell as its column's type; a null is a typed SQL NULL.
fn bind_cell<'q, DB>(
    query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    logical_type: LogicalType,
    cell: &Cell,
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    Option<i64>: Encode<'q, DB> + Type<DB>,
    Option<f64>: Encode<'q, DB> + Type<DB>,
    Option<bool>: Encode<'q, DB> + Type<DB>,
    Option<NaiveDateTime>: Encode<'q, DB> + Type<DB>,
    Option<String>: Encode<'q, DB> + Type<DB>,
{
    match logical_type {
        LogicalType::Integer => query.bind(match cell {
            Cell::Integer(v) => Some(*v),
            _ => None,
        }),
        LogicalType::Float => query.bind(match cell {
            Cell::Float(v) => Some(*v),
            Cell::Integer(v) => Some(*v as f64),
            _ => None,
        }),
        LogicalType::Boolean => query.bind(match cell {
            Cell::Boolean(v) => Some(*v),
            _ => None,
        }),
        LogicalType::Timestamp => query.bind(match cell {
            Cell::Timestamp(v) => Some(*v),
            _ => None,
        }),
        LogicalType::Text => query.bind(match cell {
            Cell::Text(v) => Some(v.clone()),
            _ => None,
        }),
    }
}
