use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ConvertError, ImportError, Result};

/// One worksheet of a field-survey workbook: named rows of text cells
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    pub name: String,
    rows: Vec<Vec<String>>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Read every record as a row; the header, if any, stays in row 0
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let rows = csv_reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self::new(name, rows))
    }

    /// Load a CSV export; the sheet is named after the file stem
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("worksheet")
            .to_string();

        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_reader(name, file)
    }

    /// Number of rows, header included
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}

/// Positional cell lookup
pub fn cell(row: &[String], column: usize) -> std::result::Result<&str, ConvertError> {
    row.get(column)
        .map(String::as_str)
        .ok_or(ConvertError::MissingColumn(column))
}
