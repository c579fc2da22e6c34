use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReporterError>;

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to read CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to write workbook: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error(
        "Could not find required columns. Headers must be \"RollNo\", \"Name\", \"Dept\" and \"Semister\". Found: {}",
        .0.join(", ")
    )]
    MissingColumns(Vec<String>),

    #[error("No valid data rows found in roster")]
    EmptyRoster,

    #[error("Invalid spreadsheet link: {0}")]
    InvalidSpreadsheetUrl(String),

    #[error("Too many mark columns: {0}")]
    TooManyColumns(u32),
}
