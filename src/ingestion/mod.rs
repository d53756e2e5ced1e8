//! Ingestion Module - turns an uploaded file into a [`TabularDataset`]
//! 
//! Gate the file name first (extension allow-list), then hand the path to
//! the connector for its format. Nothing here touches the database.

pub mod connector;
pub mod csv_connector;
pub mod excel_connector;

pub use connector::DatasetSource;
pub use csv_connector::CsvConnector;
pub use excel_connector::ExcelConnector;

use crate::dataset::TabularDataset;
use crate::error::{Result, UploadError};
use std::path::{Path, PathBuf};

pub const ALLOWED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Excel,
}

impl FileKind {
    pub fn from_file_name(name: &str) -> Option<FileKind> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" | "xls" => Some(FileKind::Excel),
            _ => None,
        }
    }
}

/// True when the name carries one of [`ALLOWED_EXTENSIONS`].
pub fn allowed_file(name: &str) -> bool {
    FileKind::from_file_name(name).is_some()
}

/// Validate the path and pick the connector for its format.
pub fn connector_for(path: &Path) -> Result<Box<dyn DatasetSource>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if file_name.is_empty() {
        return Err(UploadError::Input("no file selected".to_string()));
    }

    let kind = FileKind::from_file_name(&file_name).ok_or_else(|| {
        UploadError::Input(format!(
            "'{}' is not a CSV or Excel file (allowed: {})",
            file_name,
            ALLOWED_EXTENSIONS.join(", ")
        ))
    })?;

    if !path.is_file() {
        return Err(UploadError::Input(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let path = PathBuf::from(path);
    Ok(match kind {
        FileKind::Csv => Box::new(CsvConnector::new(path)),
        FileKind::Excel => Box::new(ExcelConnector::new(path)),
    })
}

/// Parse an uploaded file into a dataset.
pub fn read_dataset(path: &Path) -> Result<TabularDataset> {
    let source = connector_for(path)?;
    let dataset = source.read()?;
    tracing::info!(
        source_type = source.source_type(),
        rows = dataset.row_count(),
        columns = dataset.width(),
        "parsed {}",
        path.display()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("people.csv"));
        assert!(allowed_file("Report.XLSX"));
        assert!(allowed_file("legacy.final.xls"));
        assert!(!allowed_file("notes.txt"));
        assert!(!allowed_file("csv"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn test_connector_rejects_before_reading() {
        let err = connector_for(Path::new("/tmp/data.json")).err().unwrap();
        assert!(matches!(err, UploadError::Input(_)));

        let err = connector_for(Path::new("")).err().unwrap();
        assert!(err.to_string().contains("no file selected"));

        let err = connector_for(Path::new("/definitely/not/here.csv")).err().unwrap();
        assert!(err.to_string().contains("file not found"));
    }
}
