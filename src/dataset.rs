//! In-memory tabular dataset parsed from an uploaded file
//!
//! Every column carries one inferred [`LogicalType`] and its cells are
//! normalized to that type. Missing values are [`Cell::Null`], never a
//! sentinel string.

use crate::error::{Result, UploadError};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens read as a missing value rather than as text.
pub const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NULL", "null", "NaN", "nan", "None", "<NA>", "#N/A",
];

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Value domain inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    Integer,
    Float,
    Timestamp,
    Boolean,
    Text,
}

impl LogicalType {
    /// Infer the narrowest type that holds every non-null cell.
    ///
    /// Integers widen to Float when mixed with floats; any other mix, and a
    /// column with no values at all, is Text.
    pub fn infer<'a, I>(cells: I) -> LogicalType
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut seen = false;
        let mut all_int = true;
        let mut all_numeric = true;
        let mut all_bool = true;
        let mut all_timestamp = true;

        for cell in cells {
            match cell {
                Cell::Null => continue,
                Cell::Integer(_) => {
                    all_bool = false;
                    all_timestamp = false;
                }
                Cell::Float(_) => {
                    all_int = false;
                    all_bool = false;
                    all_timestamp = false;
                }
                Cell::Boolean(_) => {
                    all_int = false;
                    all_numeric = false;
                    all_timestamp = false;
                }
                Cell::Timestamp(_) => {
                    all_int = false;
                    all_numeric = false;
                    all_bool = false;
                }
                Cell::Text(_) => {
                    all_int = false;
                    all_numeric = false;
                    all_bool = false;
                    all_timestamp = false;
                }
            }
            seen = true;
        }

        if !seen {
            LogicalType::Text
        } else if all_int {
            LogicalType::Integer
        } else if all_numeric {
            LogicalType::Float
        } else if all_timestamp {
            LogicalType::Timestamp
        } else if all_bool {
            LogicalType::Boolean
        } else {
            LogicalType::Text
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalType::Integer => "integer",
            LogicalType::Float => "float",
            LogicalType::Timestamp => "timestamp",
            LogicalType::Boolean => "boolean",
            LogicalType::Text => "text",
        };
        f.write_str(name)
    }
}

/// A single value in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl Cell {
    /// Coerce a raw text field into the most specific cell it parses as.
    pub fn from_raw(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if NULL_TOKENS.contains(&trimmed) {
            return Cell::Null;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return Cell::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Cell::Boolean(false);
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Integer(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return Cell::from_float(f);
        }

        if let Some(ts) = parse_timestamp(trimmed) {
            return Cell::Timestamp(ts);
        }

        Cell::Text(trimmed.to_string())
    }

    /// NaN is a missing value, not a number.
    pub fn from_float(f: f64) -> Cell {
        if f.is_nan() {
            Cell::Null
        } else {
            Cell::Float(f)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    fn render(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Boolean(b) => Some(b.to_string()),
            Cell::Timestamp(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }

    fn normalize(self, target: LogicalType) -> Cell {
        match (target, self) {
            (_, Cell::Null) => Cell::Null,
            (LogicalType::Float, Cell::Integer(i)) => Cell::Float(i as f64),
            (LogicalType::Text, cell @ Cell::Text(_)) => cell,
            (LogicalType::Text, cell) => cell.render().map_or(Cell::Null, Cell::Text),
            (_, cell) => cell,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// A named column of cells sharing one logical type.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    logical_type: LogicalType,
    cells: Vec<Cell>,
}

impl Column {
    /// Build a column, inferring its type from the cells.
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let logical_type = LogicalType::infer(&cells);
        Self::typed(name, logical_type, cells)
    }

    /// Build a column with a known type; cells are normalized to it.
    pub fn typed(name: impl Into<String>, logical_type: LogicalType, cells: Vec<Cell>) -> Self {
        let cells = cells
            .into_iter()
            .map(|cell| cell.normalize(logical_type))
            .collect();
        Self {
            name: name.into(),
            logical_type,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Parsed file contents: ordered columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl TabularDataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(ragged) = columns.iter().find(|c| c.len() != row_count) {
            return Err(UploadError::Input(format!(
                "column '{}' has {} rows, expected {}",
                ragged.name(),
                ragged.len(),
                row_count
            )));
        }
        Ok(Self { columns, row_count })
    }

    /// Build from a header and row-major cells, inferring each column's type.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = headers.len();
        let mut by_column: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); width];

        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(UploadError::Input(format!(
                    "row {} has {} values, expected {}",
                    idx + 1,
                    row.len(),
                    width
                )));
            }
            for (slot, cell) in by_column.iter_mut().zip(row) {
                slot.push(cell);
            }
        }

        let columns = headers
            .into_iter()
            .zip(by_column)
            .map(|(name, cells)| Column::new(name, cells))
            .collect();
        Self::new(columns)
    }

    /// Convert a polars frame, trusting the frame's dtypes for inference.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());
        for series in df.get_columns() {
            columns.push(series_to_column(series)?);
        }
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.columns[column].cells[row]
    }
}

fn series_to_column(series: &Series) -> Result<Column> {
    let name = series.name().to_string();
    let dtype = series.dtype().clone();

    let column = if dtype.is_integer() {
        let cast = series.cast(&DataType::Int64)?;
        let cells = cast
            .i64()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Integer))
            .collect();
        Column::typed(name, LogicalType::Integer, cells)
    } else if dtype.is_float() {
        let cast = series.cast(&DataType::Float64)?;
        let cells = cast
            .f64()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::from_float))
            .collect();
        Column::typed(name, LogicalType::Float, cells)
    } else if matches!(dtype, DataType::Boolean) {
        let cells = series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Boolean))
            .collect();
        Column::typed(name, LogicalType::Boolean, cells)
    } else if matches!(dtype, DataType::Date | DataType::Datetime(_, _)) {
        let cast = series.cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
        let cells = cast
            .datetime()?
            .as_datetime_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Timestamp))
            .collect();
        Column::typed(name, LogicalType::Timestamp, cells)
    } else {
        let cast = series.cast(&DataType::String)?;
        let cells = cast
            .str()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, |s| Cell::Text(s.to_string())))
            .collect();
        Column::typed(name, LogicalType::Text, cells)
    };

    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from_raw(v)).collect()
    }

    #[test]
    fn test_coerce_raw_cells() {
        assert_eq!(Cell::from_raw(" 42 "), Cell::Integer(42));
        assert_eq!(Cell::from_raw("2.5"), Cell::Float(2.5));
        assert_eq!(Cell::from_raw("TRUE"), Cell::Boolean(true));
        assert_eq!(Cell::from_raw(""), Cell::Null);
        assert_eq!(Cell::from_raw("NaN"), Cell::Null);
        assert_eq!(Cell::from_raw("None"), Cell::Null);
        assert_eq!(Cell::from_raw("Alice"), Cell::Text("Alice".to_string()));

        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(Cell::from_raw("2024-03-01 12:30:00"), Cell::Timestamp(expected));
        assert_eq!(Cell::from_raw("2024-03-01T12:30:00"), Cell::Timestamp(expected));
        assert!(matches!(Cell::from_raw("2024-03-01"), Cell::Timestamp(_)));
    }

    #[test]
    fn test_infer_homogeneous_columns() {
        assert_eq!(LogicalType::infer(&raw(&["1", "2", ""])), LogicalType::Integer);
        assert_eq!(LogicalType::infer(&raw(&["1.5", "2.0"])), LogicalType::Float);
        assert_eq!(LogicalType::infer(&raw(&["true", "false", "NA"])), LogicalType::Boolean);
        assert_eq!(
            LogicalType::infer(&raw(&["2024-01-01", "2024-01-02 08:00:00"])),
            LogicalType::Timestamp
        );
        assert_eq!(LogicalType::infer(&raw(&["a", "b"])), LogicalType::Text);
    }

    #[test]
    fn test_infer_mixed_columns() {
        assert_eq!(LogicalType::infer(&raw(&["1", "2.5"])), LogicalType::Float);
        assert_eq!(LogicalType::infer(&raw(&["1", "yes"])), LogicalType::Text);
        assert_eq!(LogicalType::infer(&raw(&["true", "1"])), LogicalType::Text);
        assert_eq!(LogicalType::infer(&raw(&["", "", ""])), LogicalType::Text);
    }

    #[test]
    fn test_column_normalizes_cells() {
        let column = Column::new("score", raw(&["1", "2.5", ""]));
        assert_eq!(column.logical_type(), LogicalType::Float);
        assert_eq!(column.cells(), &[Cell::Float(1.0), Cell::Float(2.5), Cell::Null]);

        let column = Column::new("code", raw(&["7", "x7", ""]));
        assert_eq!(column.logical_type(), LogicalType::Text);
        assert_eq!(
            column.cells(),
            &[Cell::Text("7".to_string()), Cell::Text("x7".to_string()), Cell::Null]
        );
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = TabularDataset::new(vec![
            Column::new("a", raw(&["1", "2"])),
            Column::new("b", raw(&["1"])),
        ]);
        assert!(matches!(result, Err(UploadError::Input(_))));

        let result = TabularDataset::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![raw(&["1", "2"]), raw(&["3"])],
        );
        assert!(matches!(result, Err(UploadError::Input(_))));
    }

    #[test]
    fn test_from_rows_scenario() {
        let ds = TabularDataset::from_rows(
            vec!["id".to_string(), "name".to_string(), "age".to_string()],
            vec![vec![Cell::Integer(1), Cell::Text("Alice".to_string()), Cell::Integer(30)]],
        )
        .unwrap();

        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.column_names(), vec!["id", "name", "age"]);
        assert_eq!(ds.columns()[1].logical_type(), LogicalType::Text);
        assert_eq!(ds.cell(0, 2), &Cell::Integer(30));
    }

    #[test]
    fn test_from_frame() {
        let df = df! [
            "id" => [Some(1i64), None, Some(3)],
            "price" => [Some(1.5f64), Some(f64::NAN), None],
            "active" => [true, false, true],
            "name" => ["a", "b", "c"]
        ]
        .unwrap();

        let ds = TabularDataset::from_frame(&df).unwrap();
        let types: Vec<LogicalType> = ds.columns().iter().map(Column::logical_type).collect();
        assert_eq!(
            types,
            vec![
                LogicalType::Integer,
                LogicalType::Float,
                LogicalType::Boolean,
                LogicalType::Text
            ]
        );
        assert_eq!(ds.cell(1, 0), &Cell::Null);
        // NaN is a missing value, not a number
        assert_eq!(ds.cell(1, 1), &Cell::Null);
        assert_eq!(ds.cell(2, 1), &Cell::Null);
    }
}
