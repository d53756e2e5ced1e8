//! Dataset Source Trait - abstract interface for uploaded file formats

use crate::dataset::TabularDataset;
use crate::error::Result;

/// A parsed-on-demand tabular file.
/// 
/// Implementations:
/// - CsvConnector: comma-separated text, read with polars
/// - ExcelConnector: first worksheet of an xlsx/xls workbook
pub trait DatasetSource: Send + Sync {
    /// Read the whole file into memory
    fn read(&self) -> Result<TabularDataset>;
    
    /// Get source type (e.g., "csv", "excel")
    fn source_type(&self) -> &str;
    
    /// Get source URI/path (if applicable)
    fn source_uri(&self) -> Option<&str>;
}
