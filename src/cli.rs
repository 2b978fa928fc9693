use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Season, SheetOptions, TrapType, DATABASE_ENV};

#[derive(Parser, Debug)]
#[command(name = "tsetse-db")]
#[command(version, about = "Import tsetse field-survey worksheets into a sample-tracking database")]
pub struct Cli {
    /// SQLite database path (default: platform data directory)
    #[arg(short, long, global = true, env = DATABASE_ENV)]
    pub database: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "tsetse_db=trace" (default: RUST_LOG or info)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create any missing tables
    Init,

    /// Import a survey summary sheet (traps and villages)
    ImportSummary {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Season the traps were deployed in
        #[arg(long, value_enum, default_value_t = Season::Wet)]
        season: Season,

        /// Trap design
        #[arg(long, value_enum, default_value_t = TrapType::Biconical)]
        trap_type: TrapType,
    },

    /// Import a dissection sheet (flies)
    ImportDissection {
        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// List all table names
    ListTables,
}

#[derive(Args, Debug)]
pub struct SheetArgs {
    /// Worksheet exported as CSV
    pub worksheet: PathBuf,

    /// Village reference file (`<code>,<name>` per line); defaults to the bundled list
    #[arg(long)]
    pub villages: Option<PathBuf>,

    /// The first row is data, not column titles
    #[arg(long)]
    pub no_header: bool,

    /// Resume from this zero-based row
    #[arg(long)]
    pub start_row: Option<usize>,

    /// Print the import report as JSON
    #[arg(long)]
    pub json: bool,
}

impl SheetArgs {
    pub fn options(&self, season: Season, trap_type: TrapType) -> SheetOptions {
        SheetOptions {
            has_header_row: !self.no_header,
            season,
            trap_type,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
