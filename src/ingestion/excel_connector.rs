//! Excel Connector - reads the first worksheet of an xlsx/xls workbook

use crate::dataset::{Cell, TabularDataset, NULL_TOKENS};
use crate::error::{Result, UploadError};
use crate::ingestion::connector::DatasetSource;
use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::PathBuf;

/// Largest magnitude at which every integral f64 is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

pub struct ExcelConnector {
    path: PathBuf,
    source_uri: Option<String>,
}

impl ExcelConnector {
    pub fn new(path: PathBuf) -> Self {
        let source_uri = path.to_str().map(|s| s.to_string());
        Self { path, source_uri }
    }
}

/// Spreadsheets store every number as a float; integral values are integers.
fn excel_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Null,
        Data::Int(i) => Cell::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => Cell::Integer(*f as i64),
        Data::Float(f) => Cell::from_float(*f),
        Data::Bool(b) => Cell::Boolean(*b),
        Data::String(s) => text_cell(s),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            data.as_datetime().map_or(Cell::Null, Cell::Timestamp)
        }
        Data::Error(_) => Cell::Null,
        other => other.as_string().map_or(Cell::Null, |s| text_cell(&s)),
    }
}

/// A typed text cell stays text verbatim; only a null token is missing.
fn text_cell(s: &str) -> Cell {
    if NULL_TOKENS.contains(&s.trim()) {
        Cell::Null
    } else {
        Cell::Text(s.to_string())
    }
}

fn header_name(idx: usize, data: &Data) -> String {
    let name = data.to_string();
    let name = name.trim();
    if name.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        name.to_string()
    }
}

impl DatasetSource for ExcelConnector {
    fn read(&self) -> Result<TabularDataset> {
        let mut workbook = open_workbook_auto(&self.path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| UploadError::Input("workbook has no worksheets".to_string()))??;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(idx, data)| header_name(idx, data))
                .collect(),
            None => return Err(UploadError::Input("worksheet is empty".to_string())),
        };

        let body: Vec<Vec<Cell>> = rows
            .map(|row| row.iter().map(excel_cell).collect())
            .collect();

        TabularDataset::from_rows(headers, body)
    }

    fn source_type(&self) -> &str {
        "excel"
    }

    fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::LogicalType;
    use chrono::NaiveDate;

    #[test]
    fn test_numbers_follow_integral_values() {
        assert_eq!(excel_cell(&Data::Float(30.0)), Cell::Integer(30));
        assert_eq!(excel_cell(&Data::Float(2.5)), Cell::Float(2.5));
        assert_eq!(excel_cell(&Data::Float(f64::NAN)), Cell::Null);
        assert_eq!(excel_cell(&Data::Int(-4)), Cell::Integer(-4));
    }

    #[test]
    fn test_text_and_empty_cells() {
        assert_eq!(excel_cell(&Data::Empty), Cell::Null);
        assert_eq!(excel_cell(&Data::Bool(true)), Cell::Boolean(true));
        assert_eq!(
            excel_cell(&Data::String("Alice".to_string())),
            Cell::Text("Alice".to_string())
        );
        assert_eq!(excel_cell(&Data::String("None".to_string())), Cell::Null);
    }

    #[test]
    fn test_text_cells_are_not_reparsed() {
        assert_eq!(
            excel_cell(&Data::String("007".to_string())),
            Cell::Text("007".to_string())
        );
        assert_eq!(
            excel_cell(&Data::String("true".to_string())),
            Cell::Text("true".to_string())
        );
        assert_eq!(excel_cell(&Data::String(" NA ".to_string())), Cell::Null);

        let ds = TabularDataset::from_rows(
            vec!["zip".to_string()],
            vec![
                vec![excel_cell(&Data::String("007".to_string()))],
                vec![excel_cell(&Data::String("abc".to_string()))],
                vec![excel_cell(&Data::String("  padded ".to_string()))],
                vec![excel_cell(&Data::Float(12.0))],
            ],
        )
        .unwrap();
        assert_eq!(ds.columns()[0].logical_type(), LogicalType::Text);
        assert_eq!(ds.cell(0, 0), &Cell::Text("007".to_string()));
        assert_eq!(ds.cell(2, 0), &Cell::Text("  padded ".to_string()));
        assert_eq!(ds.cell(3, 0), &Cell::Text("12".to_string()));
    }

    #[test]
    fn test_iso_datetime_cell() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let cell = excel_cell(&Data::DateTimeIso("2024-05-01T08:30:00".to_string()));
        assert_eq!(cell, Cell::Timestamp(expected));
    }

    #[test]
    fn test_blank_header_gets_position_name() {
        assert_eq!(header_name(2, &Data::Empty), "column_3");
        assert_eq!(header_name(0, &Data::String(" qty ".to_string())), "qty");
    }

    #[test]
    fn test_missing_workbook_is_error() {
        let connector = ExcelConnector::new(PathBuf::from("/no/such/book.xlsx"));
        assert!(connector.read().is_err());
    }
}
