use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tsetse_db::{
    cli::{Cli, Commands, SheetArgs},
    config::{default_database_path, Season, TrapType},
    logging::init_logging,
    schema::table_names,
    Database, ImportReport, SheetImporter, SheetKind, Vocabulary, Worksheet, DISSECTION, SUMMARY,
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.log_level.as_deref(), cli.log_json)?;

    let database = cli.database.clone();

    match cli.command {
        Commands::Init => {
            let db_path = resolve_database(database)?;
            Database::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?
                .create_schema()
                .context("Failed to create schema")?;
            println!("Schema ready in {:?}", db_path);
        }

        Commands::ImportSummary {
            sheet,
            season,
            trap_type,
        } => {
            let db_path = resolve_database(database)?;
            import_sheet(&SUMMARY, &sheet, season, trap_type, db_path)?;
        }

        Commands::ImportDissection { sheet } => {
            let db_path = resolve_database(database)?;
            import_sheet(&DISSECTION, &sheet, Season::Wet, TrapType::Biconical, db_path)?;
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

fn resolve_database(database: Option<PathBuf>) -> Result<PathBuf> {
    match database {
        Some(path) => Ok(path),
        None => default_database_path(),
    }
}

fn import_sheet(
    kind: &'static SheetKind,
    args: &SheetArgs,
    season: Season,
    trap_type: TrapType,
    db_path: PathBuf,
) -> Result<()> {
    let start = Instant::now();

    let vocab = match &args.villages {
        Some(path) => Vocabulary::load(path)
            .with_context(|| format!("Failed to load village reference {:?}", path))?,
        None => Vocabulary::bundled()?,
    };

    let worksheet = Worksheet::from_csv_path(&args.worksheet)
        .with_context(|| format!("Failed to read worksheet {:?}", args.worksheet))?;

    let mut importer = SheetImporter::new(
        kind,
        &worksheet,
        &args.worksheet,
        &vocab,
        &db_path,
        args.options(season, trap_type),
    )?;

    let results = match args.start_row {
        Some(row) => {
            importer.set_current_row(row)?;
            importer.process_remaining()?
        }
        None => importer.process_rows()?,
    };

    let report = ImportReport::from_results(worksheet.name.clone(), &results);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "\nImported {} rows from {:?} into {:?} ({} inserted, {} already present) in {:.1}s",
            report.rows,
            args.worksheet,
            db_path,
            report.inserted(),
            report.skipped(),
            start.elapsed().as_secs_f64()
        );
        for (table, counts) in &report.tables {
            println!("  {:10} {} inserted, {} skipped", table, counts.inserted, counts.skipped);
        }
    }

    Ok(())
}
