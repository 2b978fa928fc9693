pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod parser;
pub mod schema;
pub mod vocab;
pub mod worksheet;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::{Season, SheetOptions, TrapType};
pub use error::{ConvertError, ImportError, RowError};
pub use import::{ImportReport, RowResult, SheetImporter, SheetKind, DISSECTION, SUMMARY};
pub use vocab::Vocabulary;
pub use worksheet::Worksheet;
pub use writer::{Database, InsertOutcome};
