//! CSV Connector - reads a CSV file through polars' schema inference

use crate::dataset::{TabularDataset, NULL_TOKENS};
use crate::error::{Result, UploadError};
use crate::ingestion::connector::DatasetSource;
use polars::prelude::*;
use std::path::PathBuf;

pub struct CsvConnector {
    path: PathBuf,
    source_uri: Option<String>,
}

impl CsvConnector {
    pub fn new(path: PathBuf) -> Self {
        let source_uri = path.to_str().map(|s| s.to_string());
        Self { path, source_uri }
    }

    fn read_frame(&self) -> Result<DataFrame> {
        if std::fs::metadata(&self.path)?.len() == 0 {
            return Err(UploadError::Input(format!("{} is empty", self.path.display())));
        }

        let null_values = NULL_TOKENS.iter().map(|s| s.to_string()).collect();
        let df = LazyCsvReader::new(&self.path)
            .with_has_header(true)
            .with_try_parse_dates(true)
            .with_null_values(Some(NullValues::AllColumns(null_values)))
            .finish()?
            .collect()?;
        Ok(df)
    }
}

impl DatasetSource for CsvConnector {
    fn read(&self) -> Result<TabularDataset> {
        let df = self.read_frame()?;
        if df.width() == 0 {
            return Err(UploadError::Input("file has no columns".to_string()));
        }
        TabularDataset::from_frame(&df)
    }

    fn source_type(&self) -> &str {
        "csv"
    }

    fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }
}
