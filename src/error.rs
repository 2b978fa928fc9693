//! Error types for worksheet conversion and import
//!
//! Field-level problems surface as [`ConvertError`], row-level problems as
//! [`RowError`], and everything an importer reports to its caller as
//! [`ImportError`], which carries the sheet, row and source file.

use std::path::PathBuf;
use thiserror::Error;

/// A raw cell value that could not be normalized
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("unrecognized {kind} '{value}' in {context}")]
    Unrecognized {
        kind: &'static str,
        value: String,
        context: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("'{0}' is not a day/month/year date")]
    MalformedDate(String),

    #[error("no digits found in '{0}'")]
    NoDigits(String),

    #[error("'{value}' is not a valid {expected}")]
    InvalidNumber {
        value: String,
        expected: &'static str,
    },

    #[error("row has no column {0}")]
    MissingColumn(usize),
}

/// Failure while building or inserting one worksheet row
#[derive(Error, Debug)]
pub enum RowError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("'{0}' is not currently a recognized village")]
    UnknownVillage(String),

    #[error("insert into {table} failed: {source}")]
    Insert {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

/// Errors reported by the importers and the reference-data loaders
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{source} (sheet '{sheet}', row {}, file {})", .row + 1, .path.display())]
    Row {
        sheet: String,
        /// Zero-based row index
        row: usize,
        path: PathBuf,
        #[source]
        source: RowError,
    },

    #[error("sheet kind '{sheet}' registers no insert producers")]
    NoProducers { sheet: &'static str },

    #[error("row must be between 0 and {last}, got {requested}")]
    RowOutOfRange { requested: usize, last: usize },

    #[error("worksheet '{0}' has no rows")]
    EmptySheet(String),

    #[error("invalid schema: {0}")]
    Schema(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed reference data: {0}")]
    Reference(String),
}

impl ImportError {
    /// The row-level cause, when the error belongs to a specific row
    pub fn row_error(&self) -> Option<&RowError> {
        match self {
            ImportError::Row { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
