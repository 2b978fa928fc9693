//! Controlled vocabularies used to normalize worksheet cells
//!
//! - Species abbreviations are generated from [`SPECIES_NAMES`] by a fixed set
//!   of abbreviation styles.
//! - Infection-status codes map onto [`INFECTION_STATUSES`].
//! - Villages come from a `<code>,<name>` reference file and resolve in both
//!   directions.
//!
//! Everything here is built once and then shared read-only through
//! [`Vocabulary`].

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{ImportError, Result};

pub const SPECIES_NAMES: &[&str] = &[
    "Glossina fuscipes fuscipes",
    "Glossina morsitans morsitans",
    "Glossina pallidipes",
];

pub const NOT_DISSECTED: &str = "not dissected";
pub const NEGATIVE: &str = "negative";
pub const POSITIVE: &str = "positive";
pub const INFECTION_STATUSES: &[&str] = &[NOT_DISSECTED, NEGATIVE, POSITIVE];

/// Accepted hunger-stage and wing-fray values
pub const STAGE_VALUES: &[&str] = &["NA", "1", "2", "3", "4"];

/// Village reference shipped with the crate
pub const DEFAULT_VILLAGE_MAP: &str = include_str!("../data/village_id_map.csv");

/// Map a raw tissue result code onto its infection status
pub fn infection_status(code: &str) -> Option<&'static str> {
    match code.trim() {
        "TENERAL" | "DEAD" => Some(NOT_DISSECTED),
        "negative" | "-" | "0" => Some(NEGATIVE),
        "positive" | "+" | "1" => Some(POSITIVE),
        _ => None,
    }
}

// =============================================================================
// Species abbreviations
// =============================================================================

/// An abbreviation style; `None` when the style does not apply to a name
pub type AbbrevStyle = fn(&str) -> Option<String>;

fn initials(name: &str) -> impl Iterator<Item = char> + '_ {
    name.split_whitespace().filter_map(|word| word.chars().next())
}

/// `Glossina fuscipes fuscipes` -> `G.f`
fn abbrev_g_dot_x(name: &str) -> Option<String> {
    let parts: Vec<String> = initials(name).take(2).map(String::from).collect();
    Some(parts.join("."))
}

/// `Glossina fuscipes fuscipes` -> `G.f.`
fn abbrev_g_dot_x_dot(name: &str) -> Option<String> {
    Some(initials(name).take(2).flat_map(|c| [c, '.']).collect())
}

/// `Glossina fuscipes fuscipes` -> `Gf`
fn abbrev_gx(name: &str) -> Option<String> {
    Some(initials(name).take(2).collect())
}

/// `Glossina fuscipes fuscipes` -> `G.ff`
fn abbrev_g_dot_xx(name: &str) -> Option<String> {
    let mut chars = initials(name);
    let genus = chars.next()?;
    Some(format!("{}.{}", genus, chars.collect::<String>()))
}

/// `Glossina fuscipes fuscipes` -> `GFF`
fn abbrev_gxx_upper(name: &str) -> Option<String> {
    Some(initials(name).flat_map(char::to_uppercase).collect())
}

/// `Glossina fuscipes fuscipes` -> `Gff`
fn abbrev_gxx(name: &str) -> Option<String> {
    Some(initials(name).collect())
}

/// `Glossina fuscipes fuscipes` -> `G.f.f.`
fn abbrev_g_dot_x_dot_x(name: &str) -> Option<String> {
    Some(initials(name).flat_map(|c| [c, '.']).collect())
}

/// Field sheets write `G.pd` for pallidipes
fn abbrev_pallidipes(name: &str) -> Option<String> {
    (name == "Glossina pallidipes").then(|| "G.pd".to_string())
}

/// Abbreviation styles in table-build order
pub const ABBREV_STYLES: &[AbbrevStyle] = &[
    abbrev_g_dot_x,
    abbrev_g_dot_x_dot,
    abbrev_gx,
    abbrev_g_dot_xx,
    abbrev_gxx_upper,
    abbrev_gxx,
    abbrev_g_dot_x_dot_x,
    abbrev_pallidipes,
];

/// Abbreviation -> full binomial
#[derive(Debug, Clone)]
pub struct SpeciesTable {
    entries: HashMap<String, &'static str>,
}

impl SpeciesTable {
    /// Apply every style to every species name; later entries overwrite earlier ones
    pub fn generate() -> Self {
        let mut entries = HashMap::new();

        for &name in SPECIES_NAMES {
            for style in ABBREV_STYLES {
                if let Some(abbrev) = style(name) {
                    entries.insert(abbrev, name);
                }
            }
        }

        debug!(abbreviations = entries.len(), "built species table");
        Self { entries }
    }

    pub fn lookup(&self, abbrev: &str) -> Option<&'static str> {
        self.entries.get(abbrev.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self::generate()
    }
}

// =============================================================================
// Villages
// =============================================================================

/// Two-way mapping between village codes and display names
#[derive(Debug, Clone, Default)]
pub struct VillageMap {
    /// code -> name and name -> code in one map
    pairs: HashMap<String, String>,
    codes: HashSet<String>,
    names: HashSet<String>,
}

impl VillageMap {
    /// Read `<code>,<name>` records (no header)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut map = Self::default();
        for record in csv_reader.records() {
            let record = record?;
            let (code, name) = match (record.get(0), record.get(1)) {
                (Some(code), Some(name)) if !code.is_empty() && !name.is_empty() => (code, name),
                _ => {
                    return Err(ImportError::Reference(format!(
                        "expected <code>,<name> but found {:?}",
                        record
                    )))
                }
            };
            map.insert(code, name);
        }

        debug!(villages = map.len(), "loaded village reference");
        Ok(map)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn insert(&mut self, code: &str, name: &str) {
        self.pairs.insert(code.to_string(), name.to_string());
        self.pairs.insert(name.to_string(), code.to_string());
        self.codes.insert(code.to_string());
        self.names.insert(name.to_string());
    }

    /// True for any known code or name
    pub fn is_known(&self, value: &str) -> bool {
        self.pairs.contains_key(value)
    }

    pub fn is_code(&self, value: &str) -> bool {
        self.codes.contains(value)
    }

    /// Resolve a code or a name to the display name
    pub fn name_for(&self, value: &str) -> Option<&str> {
        if self.is_code(value) {
            self.pairs.get(value).map(String::as_str)
        } else if self.names.contains(value) {
            self.names.get(value).map(String::as_str)
        } else {
            None
        }
    }

    /// Resolve a code or a name to the code
    pub fn code_for(&self, value: &str) -> Option<&str> {
        if self.is_code(value) {
            self.codes.get(value).map(String::as_str)
        } else {
            self.pairs.get(value).map(String::as_str)
        }
    }

    /// Number of villages
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Everything an importer needs to normalize cells
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub species: SpeciesTable,
    pub villages: VillageMap,
}

impl Vocabulary {
    pub fn new(villages: VillageMap) -> Self {
        Self {
            species: SpeciesTable::generate(),
            villages,
        }
    }

    /// Build from the village reference bundled with the crate
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(VillageMap::from_reader(DEFAULT_VILLAGE_MAP.as_bytes())?))
    }

    pub fn load(village_map: &Path) -> Result<Self> {
        Ok(Self::new(VillageMap::load(village_map)?))
    }
}
