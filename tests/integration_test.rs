//! End-to-end imports into temporary SQLite files.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use tsetse_db::{
    Database, ImportError, InsertOutcome, RowError, Season, SheetImporter, SheetOptions,
    Vocabulary, Worksheet, DISSECTION, SUMMARY,
};

// =============================================================================
// Fixtures
// =============================================================================

const SUMMARY_HEADER: &str = concat!(
    "district,county,subcounty,parish,village,trap_no,lat,lon,elevation,",
    "human_activity,vegetation,deploy_date,removal_date,notes,other_info"
);

const DISSECTION_HEADER: &str = concat!(
    "village,trap_no,lat,lon,date,species,sex,teneral,tube_code,",
    "proboscis,midgut,salivary,wing_fray,solution,comments"
);

/// Summary rows located in Pabbo East parish
fn in_pabbo(rows: &[&str]) -> Vec<String> {
    rows.iter()
        .map(|row| format!("Amuru,Kilak,Pabbo,Pabbo East,{}", row))
        .collect()
}

fn worksheet(name: &str, header: &str, rows: &[impl AsRef<str>]) -> Worksheet {
    let mut text = String::from(header);
    for row in rows {
        text.push('\n');
        text.push_str(row.as_ref());
    }
    Worksheet::from_reader(name, text.as_bytes()).expect("valid CSV")
}

fn vocab() -> Vocabulary {
    let reference = "OCA,Ocaya\nUWA,Uwalo\nGAN,Gangu\n";
    Vocabulary::new(tsetse_db::vocab::VillageMap::from_reader(reference.as_bytes()).unwrap())
}

struct Scratch {
    _dir: TempDir,
    db_path: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("tsetse.db");
        Self { _dir: dir, db_path }
    }

    fn connection(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open test database")
    }

    fn count(&self, table: &str) -> i64 {
        self.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }
}

fn survey_sheet() -> Worksheet {
    worksheet(
        "summary_test_sheet_1",
        SUMMARY_HEADER,
        &in_pabbo(&[
            "OCA,1,3.0214,32.0913,1043,grazing,bush,05/12/14,08/12/14,,first visit",
            "OCA,1,3.0214,32.0913,1043,grazing,bush,05/12/14,08/12/14,,first visit",
            "Ocaya,2,3.0220,32.0950,1051,,riverine,05/12/14,08/12/14,,",
        ]),
    )
}

fn summary_importer<'a>(
    scratch: &Scratch,
    ws: &'a Worksheet,
    vocab: &'a Vocabulary,
) -> SheetImporter<'a> {
    SheetImporter::new(
        &SUMMARY,
        ws,
        "survey.csv",
        vocab,
        &scratch.db_path,
        SheetOptions::default(),
    )
    .unwrap()
}

fn dissection_importer<'a>(
    scratch: &Scratch,
    ws: &'a Worksheet,
    vocab: &'a Vocabulary,
) -> SheetImporter<'a> {
    SheetImporter::new(
        &DISSECTION,
        ws,
        "dissections.csv",
        vocab,
        &scratch.db_path,
        SheetOptions::default(),
    )
    .unwrap()
}

fn import_summary(scratch: &Scratch, vocab: &Vocabulary) -> Vec<tsetse_db::RowResult> {
    let ws = survey_sheet();
    let mut importer = summary_importer(scratch, &ws, vocab);
    importer.process_rows().unwrap()
}

// =============================================================================
// Summary sheets
// =============================================================================

#[test]
fn test_summary_duplicate_village_is_skipped() {
    let scratch = Scratch::new();
    let vocab = vocab();

    let results = import_summary(&scratch, &vocab);

    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().map(|r| r.row).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(matches!(results[0].outcome("village"), Some(InsertOutcome::Inserted { .. })));
    assert_eq!(results[1].outcome("village"), Some(InsertOutcome::Conflict));
    assert_eq!(results[2].outcome("village"), Some(InsertOutcome::Conflict));
    for result in &results {
        assert!(matches!(result.outcome("trap"), Some(InsertOutcome::Inserted { .. })));
    }

    assert_eq!(scratch.count("village"), 1);
    assert_eq!(scratch.count("trap"), 3);
}

#[test]
fn test_summary_rows_are_normalized() {
    let scratch = Scratch::new();
    import_summary(&scratch, &vocab());

    let conn = scratch.connection();
    let (village_id, village_name, district): (String, String, String) = conn
        .query_row("SELECT village_id, village_name, district FROM village", [], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?))
        })
        .unwrap();
    assert_eq!(village_id, "OCA");
    assert_eq!(village_name, "Ocaya");
    assert_eq!(district, "Amuru");

    let mut stmt = conn
        .prepare(
            "SELECT village_name, season, trap_type, deploy_date, other_info \
             FROM trap ORDER BY trap_id",
        )
        .unwrap();
    let traps: Vec<(String, String, String, String, Option<String>)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(traps.len(), 3);
    for (village, season, trap_type, deployed, _) in &traps {
        assert_eq!(village, "Ocaya");
        assert_eq!(season, "wet");
        assert_eq!(trap_type, "biconical");
        assert_eq!(deployed, "2014-12-05");
    }
    assert_eq!(traps[0].4.as_deref(), Some("first visit"));
    assert_eq!(traps[2].4, None);
}

#[test]
fn test_season_comes_from_options() {
    let scratch = Scratch::new();
    let vocab = vocab();
    let ws = survey_sheet();
    let options = SheetOptions {
        season: Season::Dry,
        ..SheetOptions::default()
    };

    let mut importer =
        SheetImporter::new(&SUMMARY, &ws, "survey.csv", &vocab, &scratch.db_path, options)
            .unwrap();
    importer.process_row().unwrap();

    let season: String = scratch
        .connection()
        .query_row("SELECT season FROM trap", [], |r| r.get(0))
        .unwrap();
    assert_eq!(season, "dry");
}

#[test]
fn test_unknown_village_reports_sheet_row_and_value() {
    let scratch = Scratch::new();
    let vocab = vocab();
    let ws = worksheet(
        "summary_test_sheet_2",
        SUMMARY_HEADER,
        &in_pabbo(&[
            "OCA,1,3.0214,32.0913,1043,,bush,05/12/14,08/12/14,,",
            "Atlantis,2,3.0220,32.0950,1051,,bush,05/12/14,08/12/14,,",
        ]),
    );

    let mut importer = summary_importer(&scratch, &ws, &vocab);
    let err = importer.process_rows().unwrap_err();

    match &err {
        ImportError::Row { sheet, row, path, source } => {
            assert_eq!(sheet, "summary_test_sheet_2");
            assert_eq!(*row, 2);
            assert_eq!(path, Path::new("survey.csv"));
            assert!(matches!(source, RowError::UnknownVillage(v) if v == "Atlantis"));
        }
        other => panic!("unexpected {:?}", other),
    }

    let message = err.to_string();
    assert!(message.contains("Atlantis"));
    assert!(message.contains("summary_test_sheet_2"));
    assert!(message.contains("row 3"));

    // The first row went in before the failure
    assert_eq!(scratch.count("trap"), 1);
}

#[test]
fn test_connection_is_opened_lazily() {
    let scratch = Scratch::new();
    let vocab = vocab();
    let ws = survey_sheet();

    let mut importer = summary_importer(&scratch, &ws, &vocab);
    assert!(!scratch.db_path.exists());

    importer.process_row().unwrap();
    assert!(scratch.db_path.exists());
}

#[test]
fn test_resume_from_row() {
    let scratch = Scratch::new();
    let vocab = vocab();
    let ws = survey_sheet();

    let mut importer = summary_importer(&scratch, &ws, &vocab);
    importer.set_current_row(3).unwrap();
    let results = importer.process_remaining().unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].row, 3);
    assert_eq!(scratch.count("trap"), 1);

    assert!(matches!(
        importer.set_current_row(4),
        Err(ImportError::RowOutOfRange { requested: 4, last: 3 })
    ));
}

// =============================================================================
// Dissection sheets
// =============================================================================

fn dissection_sheet() -> Worksheet {
    worksheet(
        "dissections",
        DISSECTION_HEADER,
        &[
            "OCA,1,3.0214,32.0913,'21/8/14,Gff,F,NT,UG-2014-0457,-,+,-,2,RNAlater,",
            concat!(
                "Ocaya,1,3.0214,32.0913,21/08/2014,G.pd,male,T,UG-2014-0458,",
                "TENERAL,TENERAL,TENERAL,,,soft cuticle"
            ),
            "Ocaya,1,3.0214,32.0913,21/08/2014,G.m.,M,NT,UG-2014-0459,-,-,-,1,,",
        ],
    )
}

type FlyRow = (
    String,
    String,
    i64,
    String,
    String,
    String,
    String,
    i64,
    String,
    bool,
    Option<String>,
);

#[test]
fn test_dissection_after_summary() {
    let scratch = Scratch::new();
    let vocab = vocab();
    import_summary(&scratch, &vocab);

    let ws = dissection_sheet();
    let results = dissection_importer(&scratch, &ws, &vocab).process_rows().unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(scratch.count("fly"), 3);

    let conn = scratch.connection();
    let mut stmt = conn
        .prepare(
            "SELECT fly_code, village_name, collection_number, sex, species, infected, \
             wing_fray, box_id, date_of_collection, teneral, comments FROM fly ORDER BY fly_id",
        )
        .unwrap();
    let flies: Vec<FlyRow> = stmt
        .query_map([], |r| {
            Ok((
                r.get(0)?,
                r.get(1)?,
                r.get(2)?,
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
                r.get(7)?,
                r.get(8)?,
                r.get(9)?,
                r.get(10)?,
            ))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let first = &flies[0];
    assert_eq!(first.0, "UG-2014-0457");
    assert_eq!(first.1, "Ocaya");
    assert_eq!(first.2, 457);
    assert_eq!(first.3, "F");
    assert_eq!(first.4, "Glossina fuscipes fuscipes");
    assert_eq!(first.5, "positive");
    assert_eq!(first.6, "2");
    assert_eq!(first.7, -1);
    assert_eq!(first.8, "2014-08-21");
    assert!(!first.9);
    assert_eq!(first.10, None);

    let second = &flies[1];
    assert_eq!(second.3, "M");
    assert_eq!(second.4, "Glossina pallidipes");
    assert_eq!(second.5, "not dissected");
    assert_eq!(second.6, "NA");
    assert!(second.9);
    assert_eq!(second.10.as_deref(), Some("soft cuticle"));

    let third = &flies[2];
    assert_eq!(third.4, "Glossina morsitans morsitans");
    assert_eq!(third.5, "negative");
}

#[test]
fn test_dissection_reimport_is_skipped() {
    let scratch = Scratch::new();
    let vocab = vocab();
    import_summary(&scratch, &vocab);

    let ws = dissection_sheet();
    dissection_importer(&scratch, &ws, &vocab).process_rows().unwrap();
    let results = dissection_importer(&scratch, &ws, &vocab).process_rows().unwrap();

    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.outcome("fly"), Some(InsertOutcome::Conflict));
    }
    assert_eq!(scratch.count("fly"), 3);
}

#[test]
fn test_dissection_without_village_row_is_fatal() {
    let scratch = Scratch::new();
    let vocab = vocab();
    let ws = dissection_sheet();

    // The village is in the reference list but was never imported
    let err = dissection_importer(&scratch, &ws, &vocab)
        .process_rows()
        .unwrap_err();

    assert!(matches!(
        err.row_error(),
        Some(RowError::Insert { table: "fly", .. })
    ));
    assert_eq!(scratch.count("fly"), 0);
}

#[test]
fn test_shared_database_across_importers() {
    let vocab = vocab();
    let summary = survey_sheet();
    let dissections = dissection_sheet();

    let db = Database::open_in_memory().unwrap();
    db.create_schema().unwrap();

    let mut importer = SheetImporter::with_database(
        &SUMMARY,
        &summary,
        "survey.csv",
        &vocab,
        db,
        SheetOptions::default(),
    )
    .unwrap();
    importer.process_rows().unwrap();
    let db = importer.into_database().unwrap();

    let mut importer = SheetImporter::with_database(
        &DISSECTION,
        &dissections,
        "dissections.csv",
        &vocab,
        db,
        SheetOptions::default(),
    )
    .unwrap();
    importer.process_rows().unwrap();

    let db = importer.into_database().unwrap();
    assert_eq!(db.count("village").unwrap(), 1);
    assert_eq!(db.count("trap").unwrap(), 3);
    assert_eq!(db.count("fly").unwrap(), 3);
}
