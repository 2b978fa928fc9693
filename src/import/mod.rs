//! Worksheet importers
//!
//! A [`SheetKind`] describes one worksheet layout as an ordered list of
//! [`Producer`]s, one per target table. [`SheetImporter`] walks the worksheet
//! row by row, runs every producer on the row under its cursor and inserts
//! the resulting payloads one at a time. A producer whose insert collides with
//! an existing key is recorded as a conflict and the import carries on; any
//! other failure stops the import with the sheet, row and file attached.

mod dissection;
mod report;
mod summary;

pub use dissection::DISSECTION;
pub use report::{ImportReport, TableCounts};
pub use summary::SUMMARY;

use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::SheetOptions;
use crate::error::{ConvertError, ImportError, Result, RowError};
use crate::parser::Payload;
use crate::schema::TableSchema;
use crate::vocab::Vocabulary;
use crate::worksheet::{cell, Worksheet};
use crate::writer::{Database, InsertOutcome};

/// Builds the payload for one table from the current row
pub type BuildFn = fn(&RowContext) -> std::result::Result<Payload, RowError>;

#[derive(Clone, Copy)]
pub struct Producer {
    pub table: &'static TableSchema,
    pub build: BuildFn,
}

/// A worksheet layout: which tables each row populates, in order
pub struct SheetKind {
    pub name: &'static str,
    pub producers: &'static [Producer],
}

/// Everything a producer can see while building its payload
pub struct RowContext<'a> {
    pub cells: &'a [String],
    /// Zero-based row index
    pub row: usize,
    pub sheet: &'a str,
    pub path: &'a Path,
    pub vocab: &'a Vocabulary,
    pub options: &'a SheetOptions,
}

impl<'a> RowContext<'a> {
    pub fn cell(&self, column: usize) -> std::result::Result<&'a str, ConvertError> {
        cell(self.cells, column)
    }

    /// Where the row came from, for converter messages
    pub fn source(&self) -> String {
        format!("file '{}', sheet '{}'", self.path.display(), self.sheet)
    }

    /// Resolve a village code or name to the display name
    pub fn resolve_village(&self, raw: &str) -> std::result::Result<&'a str, RowError> {
        let village = raw.trim();
        self.vocab
            .villages
            .name_for(village)
            .ok_or_else(|| RowError::UnknownVillage(village.to_string()))
    }

    /// Resolve a village code or name to the code
    pub fn village_code(&self, raw: &str) -> std::result::Result<&'a str, RowError> {
        let village = raw.trim();
        self.vocab
            .villages
            .code_for(village)
            .ok_or_else(|| RowError::UnknownVillage(village.to_string()))
    }
}

/// Outcome of one producer's insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertResult {
    pub table: &'static str,
    #[serde(flatten)]
    pub outcome: InsertOutcome,
}

/// Everything inserted for one worksheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowResult {
    /// Zero-based row index
    pub row: usize,
    pub inserts: Vec<InsertResult>,
}

impl RowResult {
    pub fn outcome(&self, table: &str) -> Option<InsertOutcome> {
        self.inserts
            .iter()
            .find(|r| r.table == table)
            .map(|r| r.outcome)
    }
}

pub struct SheetImporter<'a> {
    kind: &'static SheetKind,
    worksheet: &'a Worksheet,
    source_path: PathBuf,
    vocab: &'a Vocabulary,
    options: SheetOptions,
    db_path: Option<PathBuf>,
    database: OnceCell<Database>,
    current_row: usize,
}

impl<'a> SheetImporter<'a> {
    /// Importer writing to the database at `db_path`, opened on first use
    pub fn new(
        kind: &'static SheetKind,
        worksheet: &'a Worksheet,
        source_path: impl Into<PathBuf>,
        vocab: &'a Vocabulary,
        db_path: impl Into<PathBuf>,
        options: SheetOptions,
    ) -> Result<Self> {
        let mut importer = Self::unopened(kind, worksheet, source_path.into(), vocab, options)?;
        importer.db_path = Some(db_path.into());
        Ok(importer)
    }

    /// Importer writing to a private in-memory database
    pub fn in_memory(
        kind: &'static SheetKind,
        worksheet: &'a Worksheet,
        source_path: impl Into<PathBuf>,
        vocab: &'a Vocabulary,
        options: SheetOptions,
    ) -> Result<Self> {
        Self::unopened(kind, worksheet, source_path.into(), vocab, options)
    }

    /// Importer writing through an already open database
    pub fn with_database(
        kind: &'static SheetKind,
        worksheet: &'a Worksheet,
        source_path: impl Into<PathBuf>,
        vocab: &'a Vocabulary,
        database: Database,
        options: SheetOptions,
    ) -> Result<Self> {
        let mut importer = Self::unopened(kind, worksheet, source_path.into(), vocab, options)?;
        importer.database = OnceCell::from(database);
        Ok(importer)
    }

    fn unopened(
        kind: &'static SheetKind,
        worksheet: &'a Worksheet,
        source_path: PathBuf,
        vocab: &'a Vocabulary,
        options: SheetOptions,
    ) -> Result<Self> {
        if kind.producers.is_empty() {
            return Err(ImportError::NoProducers { sheet: kind.name });
        }

        Ok(Self {
            kind,
            worksheet,
            source_path,
            vocab,
            options,
            db_path: None,
            database: OnceCell::new(),
            current_row: 0,
        })
    }

    pub fn current_row(&self) -> usize {
        self.current_row
    }

    /// The importer's connection; an importer that owns its database opens it
    /// and creates any missing tables on first use
    pub fn database(&self) -> Result<&Database> {
        self.database.get_or_try_init(|| {
            let db = match &self.db_path {
                Some(path) => Database::open(path)?,
                None => Database::open_in_memory()?,
            };
            db.create_schema()?;
            Ok(db)
        })
    }

    /// Give back the connection, e.g. to inspect what was imported
    pub fn into_database(self) -> Option<Database> {
        self.database.into_inner()
    }

    /// Move the cursor; valid rows are `0..=last`
    pub fn set_current_row(&mut self, row: usize) -> Result<()> {
        let last = self
            .last_row()
            .ok_or_else(|| ImportError::EmptySheet(self.worksheet.name.clone()))?;

        if row > last {
            return Err(ImportError::RowOutOfRange {
                requested: row,
                last,
            });
        }

        self.current_row = row;
        Ok(())
    }

    fn last_row(&self) -> Option<usize> {
        self.worksheet.nrows().checked_sub(1)
    }

    fn skips_header(&self) -> bool {
        self.options.has_header_row && self.current_row == 0
    }

    /// Run every producer on the row under the cursor
    pub fn process_row(&mut self) -> Result<RowResult> {
        if self.skips_header() {
            self.current_row = 1;
        }

        let row = self.current_row;
        let cells = self.worksheet.row(row).ok_or_else(|| ImportError::RowOutOfRange {
            requested: row,
            last: self.last_row().unwrap_or(0),
        })?;

        let db = self.database()?;
        let ctx = RowContext {
            cells,
            row,
            sheet: &self.worksheet.name,
            path: &self.source_path,
            vocab: self.vocab,
            options: &self.options,
        };

        let mut inserts = Vec::with_capacity(self.kind.producers.len());
        for producer in self.kind.producers {
            let outcome = run_producer(producer, &ctx, db).map_err(|source| ImportError::Row {
                sheet: self.worksheet.name.clone(),
                row,
                path: self.source_path.clone(),
                source,
            })?;

            if outcome.is_conflict() {
                info!(
                    sheet = %self.worksheet.name,
                    row = row + 1,
                    table = producer.table.name,
                    "already imported, skipping"
                );
            }

            inserts.push(InsertResult {
                table: producer.table.name,
                outcome,
            });
        }

        debug!(sheet = %self.worksheet.name, row = row + 1, "row processed");
        Ok(RowResult { row, inserts })
    }

    /// Process every data row from the top of the sheet
    pub fn process_rows(&mut self) -> Result<Vec<RowResult>> {
        if self.worksheet.is_empty() {
            return Ok(Vec::new());
        }

        self.set_current_row(0)?;
        self.process_remaining()
    }

    /// Process from the cursor through the last row, e.g. to resume an import
    pub fn process_remaining(&mut self) -> Result<Vec<RowResult>> {
        info!(
            sheet = %self.worksheet.name,
            kind = self.kind.name,
            start = self.current_row,
            rows = self.worksheet.nrows(),
            "importing worksheet"
        );

        let mut results = Vec::new();
        while self.current_row < self.worksheet.nrows() {
            if self.skips_header() {
                self.current_row = 1;
                continue;
            }

            results.push(self.process_row()?);
            self.current_row += 1;
        }

        info!(
            sheet = %self.worksheet.name,
            processed = results.len(),
            "worksheet imported"
        );
        Ok(results)
    }
}

fn run_producer(
    producer: &Producer,
    ctx: &RowContext,
    db: &Database,
) -> std::result::Result<InsertOutcome, RowError> {
    let payload = (producer.build)(ctx)?;
    debug_assert_eq!(payload.table.name, producer.table.name);

    db.insert(&payload).map_err(|source| RowError::Insert {
        table: producer.table.name,
        source,
    })
}
