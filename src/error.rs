use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Connection failed: {0}")]
    Connectivity(String),

    /// DDL rejected by the database; carries the driver message as-is.
    #[error("{0}")]
    Schema(String),

    /// DML batch rejected by the database; carries the driver message as-is.
    #[error("{0}")]
    Data(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(String),

    #[error("Excel error: {0}")]
    Excel(String),
}

impl From<polars::error::PolarsError> for UploadError {
    fn from(err: polars::error::PolarsError) -> Self {
        UploadError::Polars(err.to_string())
    }
}

impl From<calamine::Error> for UploadError {
    fn from(err: calamine::Error) -> Self {
        UploadError::Excel(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
