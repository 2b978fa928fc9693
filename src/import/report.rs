use serde::Serialize;
use std::collections::BTreeMap;

use super::RowResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub inserted: u64,
    /// Rows skipped because they were already present
    pub skipped: u64,
}

/// Totals for one worksheet import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub sheet: String,
    pub rows: usize,
    pub tables: BTreeMap<&'static str, TableCounts>,
}

impl ImportReport {
    pub fn from_results(sheet: impl Into<String>, results: &[RowResult]) -> Self {
        let mut tables: BTreeMap<&'static str, TableCounts> = BTreeMap::new();

        for insert in results.iter().flat_map(|r| r.inserts.iter()) {
            let counts = tables.entry(insert.table).or_default();
            if insert.outcome.is_conflict() {
                counts.skipped += 1;
            } else {
                counts.inserted += 1;
            }
        }

        Self {
            sheet: sheet.into(),
            rows: results.len(),
            tables,
        }
    }

    pub fn inserted(&self) -> u64 {
        self.tables.values().map(|c| c.inserted).sum()
    }

    pub fn skipped(&self) -> u64 {
        self.tables.values().map(|c| c.skipped).sum()
    }
}
