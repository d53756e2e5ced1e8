//! Upload pipeline - schema, connection, DDL and batch insert for one dataset
//! 
//! Every error is converted into an [`UploadResult::Failure`] here; callers
//! never see an `Err` or a panic from an upload.

use crate::config::ConnectionConfig;
use crate::dataset::TabularDataset;
use crate::db::{load_rows, open_connection, DbConnection, InsertPlan};
use crate::error::Result;
use crate::ingestion::read_dataset;
use crate::schema::TableSchema;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Progress of a single upload. `Failed` is reachable from every stage
/// after `Parsed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Idle,
    Parsed,
    SchemaBuilt,
    Connected,
    TableCreated,
    RowsInserted,
    Committed,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Idle => "idle",
            UploadStage::Parsed => "parsed",
            UploadStage::SchemaBuilt => "schema_built",
            UploadStage::Connected => "connected",
            UploadStage::TableCreated => "table_created",
            UploadStage::RowsInserted => "rows_inserted",
            UploadStage::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResult {
    Success { rows: u64 },
    Failure { error: String },
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success { .. })
    }

    /// Human-readable line for the CLI.
    pub fn summary(&self, table: &str) -> String {
        match self {
            UploadResult::Success { rows } => {
                format!("Successfully uploaded {} records to table \"{}\".", rows, table)
            }
            UploadResult::Failure { error } => format!("Upload Failed: Error: {}", error),
        }
    }
}

impl Serialize for UploadResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            UploadResult::Success { rows } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("rows", rows)?;
            }
            UploadResult::Failure { error } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

fn enter(stage: UploadStage) {
    debug!(stage = %stage, "upload stage");
}

/// Create the table for `dataset` (if missing) and insert all of its rows.
pub async fn upload_dataset(
    config: &ConnectionConfig,
    dataset: &TabularDataset,
    table: &str,
) -> UploadResult {
    enter(UploadStage::Idle);
    enter(UploadStage::Parsed);

    let outcome = run_upload(config, dataset, table).await;

    match outcome {
        Ok(rows) => {
            enter(UploadStage::Committed);
            info!(table = %table, rows, "upload committed");
            UploadResult::Success { rows }
        }
        Err(e) => {
            warn!(table = %table, "upload failed: {}", e);
            UploadResult::Failure {
                error: e.to_string(),
            }
        }
    }
}

async fn run_upload(
    config: &ConnectionConfig,
    dataset: &TabularDataset,
    table: &str,
) -> Result<u64> {
    let schema = TableSchema::from_dataset(dataset, table)?;
    let dialect = config.dialect.adapter();
    let ddl = schema.create_table_sql(dialect);
    let plan = InsertPlan::new(dialect, &schema, dataset.row_count());
    enter(UploadStage::SchemaBuilt);

    let mut conn = open_connection(config).await?;
    enter(UploadStage::Connected);

    let loaded = create_and_load(&mut conn, &ddl, &plan, dataset).await;
    if let Err(e) = conn.close().await {
        warn!("failed to close connection: {}", e);
    }
    loaded
}

async fn create_and_load(
    conn: &mut DbConnection,
    ddl: &str,
    plan: &InsertPlan,
    dataset: &TabularDataset,
) -> Result<u64> {
    conn.execute_ddl(ddl).await?;
    enter(UploadStage::TableCreated);

    let rows = load_rows(conn, plan, dataset).await?;
    enter(UploadStage::RowsInserted);
    Ok(rows)
}

/// Parse a CSV or Excel file and upload it.
pub async fn upload_file(config: &ConnectionConfig, path: &Path, table: &str) -> UploadResult {
    match read_dataset(path) {
        Ok(dataset) => upload_dataset(config, &dataset, table).await,
        Err(e) => {
            warn!("could not read {}: {}", path.display(), e);
            UploadResult::Failure {
                error: e.to_string(),
            }
        }
    }
}
