//! Table schema definitions for the sample-tracking database

use super::types::*;
use crate::vocab::{INFECTION_STATUSES, SPECIES_NAMES, STAGE_VALUES};

/// Box id of the placeholder box for flies that have not been filed yet
pub const STAGING_BOX_ID: i64 = -1;

pub const SEASONS: &[&str] = &["wet", "dry"];
pub const TRAP_TYPES: &[&str] = &["biconical"];
pub const SEXES: &[&str] = &["M", "F"];
pub const TUBE_CONTENTS: &[&str] = &[
    "midgut",
    "salivary gland",
    "reproductive parts",
    "carcass",
    "intact fly",
    "DNA",
    "RNA",
];

// =============================================================================
// Master data
// =============================================================================

pub static NOTE: TableSchema = TableSchema {
    name: "note",
    columns: &[
        Column::key("note_id", ColumnType::Integer),
        Column::required("note_text", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[],
};

pub static VILLAGE: TableSchema = TableSchema {
    name: "village",
    columns: &[
        Column::key("village_id", ColumnType::Text),
        Column::new("district", ColumnType::Text),
        Column::new("county", ColumnType::Text),
        Column::new("subcounty", ColumnType::Text),
        Column::new("parish", ColumnType::Text),
        Column::required("village_name", ColumnType::Text),
    ],
    foreign_keys: &[],
    // Traps and flies reference villages by display name
    indexes: &[Index::unique(&["village_name"])],
};

pub static BOX: TableSchema = TableSchema {
    name: "box",
    columns: &[
        Column::key("box_id", ColumnType::Integer),
        Column::new("room", ColumnType::Text),
        Column::new("freezer", ColumnType::Text),
        Column::new("freezer_loc", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[],
};

// =============================================================================
// Field collections
// =============================================================================

pub static TRAP: TableSchema = TableSchema {
    name: "trap",
    columns: &[
        Column::key("trap_id", ColumnType::Integer),
        Column::new("trap_number", ColumnType::Integer),
        Column::new("season", ColumnType::Text).one_of(SEASONS),
        Column::new("deploy_date", ColumnType::Date),
        Column::new("removal_date", ColumnType::Date),
        Column::new("trap_type", ColumnType::Text).one_of(TRAP_TYPES),
        Column::required("village_name", ColumnType::Text),
        Column::required("gps_coords", ColumnType::Text),
        Column::new("elevation", ColumnType::Real),
        Column::new("human_activity", ColumnType::Text),
        Column::new("veg_type", ColumnType::Text),
        Column::new("other_info", ColumnType::Text),
    ],
    foreign_keys: &[ForeignKey::new("village_name", "village", "village_name")],
    indexes: &[Index::on(&["gps_coords", "deploy_date"])],
};

pub static FLY: TableSchema = TableSchema {
    name: "fly",
    columns: &[
        Column::key("fly_id", ColumnType::Integer),
        Column::required("fly_code", ColumnType::Text),
        Column::required("village_name", ColumnType::Text),
        Column::new("collection_number", ColumnType::Integer),
        Column::new("sex", ColumnType::Text).one_of(SEXES),
        Column::new("species", ColumnType::Text).one_of(SPECIES_NAMES),
        Column::new("hunger_stage", ColumnType::Text).one_of(STAGE_VALUES),
        Column::new("wing_fray", ColumnType::Text).one_of(STAGE_VALUES),
        Column::required("box_id", ColumnType::Integer).default_sql("-1"),
        Column::new("infected", ColumnType::Text).one_of(INFECTION_STATUSES),
        Column::new("positive_proboscis", ColumnType::Text).one_of(INFECTION_STATUSES),
        Column::new("positive_midgut", ColumnType::Text).one_of(INFECTION_STATUSES),
        Column::new("positive_salivary_gland", ColumnType::Text).one_of(INFECTION_STATUSES),
        Column::new("tryps_by_scope", ColumnType::Text).one_of(INFECTION_STATUSES),
        Column::new("tryps_by_pcr", ColumnType::Boolean),
        Column::new("date_of_collection", ColumnType::Date),
        Column::required("gps_coords", ColumnType::Text),
        Column::new("teneral", ColumnType::Boolean),
    ],
    foreign_keys: &[
        ForeignKey::new("village_name", "village", "village_name"),
        ForeignKey::new("box_id", "box", "box_id"),
    ],
    // One fly per tube code
    indexes: &[Index::unique(&["fly_code"]), Index::on(&["gps_coords"])],
};

pub static TUBE: TableSchema = TableSchema {
    name: "tube",
    columns: &[
        Column::key("tube_id", ColumnType::Integer),
        Column::new("contents", ColumnType::Text).one_of(TUBE_CONTENTS),
        Column::new("solution", ColumnType::Text),
        Column::new("fly_id", ColumnType::Integer),
        Column::new("box_id", ColumnType::Integer),
        Column::new("parent_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("fly_id", "fly", "fly_id"),
        ForeignKey::new("box_id", "box", "box_id"),
        ForeignKey::new("parent_id", "tube", "tube_id"),
    ],
    indexes: &[],
};

// =============================================================================
// Note links
// =============================================================================

pub static FLY_NOTE: TableSchema = TableSchema {
    name: "fly_note",
    columns: &[
        Column::key("fly_note_id", ColumnType::Integer),
        Column::required("note_id", ColumnType::Integer),
        Column::required("fly_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("note_id", "note", "note_id"),
        ForeignKey::new("fly_id", "fly", "fly_id"),
    ],
    indexes: &[],
};

pub static VILLAGE_NOTE: TableSchema = TableSchema {
    name: "village_note",
    columns: &[
        Column::key("village_note_id", ColumnType::Integer),
        Column::required("note_id", ColumnType::Integer),
        Column::required("village_id", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("note_id", "note", "note_id"),
        ForeignKey::new("village_id", "village", "village_id"),
    ],
    indexes: &[],
};

pub static TRAP_NOTE: TableSchema = TableSchema {
    name: "trap_note",
    columns: &[
        Column::key("trap_note_id", ColumnType::Integer),
        Column::required("note_id", ColumnType::Integer),
        Column::required("trap_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("note_id", "note", "note_id"),
        ForeignKey::new("trap_id", "trap", "trap_id"),
    ],
    indexes: &[],
};

pub static TUBE_NOTE: TableSchema = TableSchema {
    name: "tube_note",
    columns: &[
        Column::key("tube_note_id", ColumnType::Integer),
        Column::required("note_id", ColumnType::Integer),
        Column::required("tube_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("note_id", "note", "note_id"),
        ForeignKey::new("tube_id", "tube", "tube_id"),
    ],
    indexes: &[],
};

pub static BOX_NOTE: TableSchema = TableSchema {
    name: "box_note",
    columns: &[
        Column::key("box_note_id", ColumnType::Integer),
        Column::required("note_id", ColumnType::Integer),
        Column::required("box_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("note_id", "note", "note_id"),
        ForeignKey::new("box_id", "box", "box_id"),
    ],
    indexes: &[],
};

/// All table schemas
pub static ALL_TABLES: &[&TableSchema] = &[
    &NOTE,
    &VILLAGE,
    &BOX,
    &TRAP,
    &FLY,
    &TUBE,
    &FLY_NOTE,
    &VILLAGE_NOTE,
    &TRAP_NOTE,
    &TUBE_NOTE,
    &BOX_NOTE,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
