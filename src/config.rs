//! Import options and default locations

use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the database location
pub const DATABASE_ENV: &str = "TSETSE_DB";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Season {
    Wet,
    Dry,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Wet => "wet",
            Season::Dry => "dry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrapType {
    Biconical,
}

impl TrapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrapType::Biconical => "biconical",
        }
    }
}

/// Per-sheet settings that do not come from the worksheet itself
#[derive(Debug, Clone)]
pub struct SheetOptions {
    /// Row 0 holds column titles and is skipped
    pub has_header_row: bool,
    /// Season recorded on traps from summary sheets
    pub season: Season,
    pub trap_type: TrapType,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            has_header_row: true,
            season: Season::Wet,
            trap_type: TrapType::Biconical,
        }
    }
}

/// `<platform data dir>/tsetse-db/tsetse.db`, creating the directory if needed
pub fn default_database_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "tsetse-db")
        .context("Could not determine data directory")?;
    let data_dir = proj_dirs.data_dir();

    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("tsetse.db"))
}
