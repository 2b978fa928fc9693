//! Survey summary sheets: one trap per row, plus the village it sits in
//!
//! Column layout: district, county, subcounty, parish, village, trap number,
//! latitude, longitude, elevation, human activity, vegetation, deploy date,
//! removal date, and "other info" in the last column.

use super::{Producer, RowContext, SheetKind};
use crate::error::RowError;
use crate::parser::convert::{
    convert_date, convert_integer, convert_real, gps_coords, optional_text, DateShape, DateValue,
};
use crate::parser::Payload;
use crate::schema::tables::{TRAP, VILLAGE};

const DISTRICT: usize = 0;
const COUNTY: usize = 1;
const SUBCOUNTY: usize = 2;
const PARISH: usize = 3;
const VILLAGE_COL: usize = 4;
const TRAP_NO: usize = 5;
const LAT: usize = 6;
const LON: usize = 7;
const ELEVATION: usize = 8;
const HUMAN_ACTIVITY: usize = 9;
const VEGETATION: usize = 10;
const DEPLOYED: usize = 11;
const REMOVED: usize = 12;

pub static SUMMARY: SheetKind = SheetKind {
    name: "summary",
    producers: &[
        Producer {
            table: &VILLAGE,
            build: build_village,
        },
        Producer {
            table: &TRAP,
            build: build_trap,
        },
    ],
};

fn build_village(ctx: &RowContext) -> Result<Payload, RowError> {
    let raw = ctx.cell(VILLAGE_COL)?;

    Ok(Payload::new(&VILLAGE)
        .set("village_id", ctx.village_code(raw)?)
        .set("village_name", ctx.resolve_village(raw)?)
        .set("district", optional_text(ctx.cell(DISTRICT)?))
        .set("county", optional_text(ctx.cell(COUNTY)?))
        .set("subcounty", optional_text(ctx.cell(SUBCOUNTY)?))
        .set("parish", optional_text(ctx.cell(PARISH)?)))
}

fn optional_date(raw: &str) -> Result<Option<DateValue>, RowError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(convert_date(raw, DateShape::Iso)?))
}

/// "Other info" sits in the last column, after the fixed layout
fn other_info(ctx: &RowContext) -> Option<String> {
    if ctx.cells.len() > REMOVED + 1 {
        ctx.cells.last().and_then(|c| optional_text(c))
    } else {
        None
    }
}

fn build_trap(ctx: &RowContext) -> Result<Payload, RowError> {
    Ok(Payload::new(&TRAP)
        .set("village_name", ctx.resolve_village(ctx.cell(VILLAGE_COL)?)?)
        .set("trap_number", convert_integer(ctx.cell(TRAP_NO)?)?)
        .set("season", ctx.options.season.as_str())
        .set("trap_type", ctx.options.trap_type.as_str())
        .set("gps_coords", gps_coords(ctx.cell(LAT)?, ctx.cell(LON)?))
        .set("elevation", convert_real(ctx.cell(ELEVATION)?)?)
        .set("human_activity", optional_text(ctx.cell(HUMAN_ACTIVITY)?))
        .set("veg_type", optional_text(ctx.cell(VEGETATION)?))
        .set("deploy_date", optional_date(ctx.cell(DEPLOYED)?)?)
        .set("removal_date", optional_date(ctx.cell(REMOVED)?)?)
        .set("other_info", other_info(ctx)))
}
