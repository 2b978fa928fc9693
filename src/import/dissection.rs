//! Dissection sheets: one fly per row
//!
//! Column layout: village, trap number, latitude, longitude, collection date,
//! species, sex, teneral, tube code, proboscis, midgut, salivary gland, wing
//! fray, solution, comments.

use super::{Producer, RowContext, SheetKind};
use crate::error::RowError;
use crate::parser::convert::{
    aggregate_infection, convert_date, convert_infection_status, convert_sex, convert_species,
    convert_stage, convert_teneral, convert_tube_code, gps_coords, optional_text, DateShape,
};
use crate::parser::Payload;
use crate::schema::tables::{FLY, STAGING_BOX_ID};

const VILLAGE_COL: usize = 0;
const LAT: usize = 2;
const LON: usize = 3;
const DATE: usize = 4;
const SPECIES: usize = 5;
const SEX: usize = 6;
const TENERAL: usize = 7;
const TUBE_CODE: usize = 8;
const PROBOSCIS: usize = 9;
const MIDGUT: usize = 10;
const SALIVARY: usize = 11;
const WING_FRAY: usize = 12;
const COMMENTS: usize = 14;

pub static DISSECTION: SheetKind = SheetKind {
    name: "dissection",
    producers: &[Producer {
        table: &FLY,
        build: build_fly,
    }],
};

/// Per-tissue results, normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tissues {
    proboscis: &'static str,
    midgut: &'static str,
    salivary: &'static str,
}

impl Tissues {
    fn from_row(ctx: &RowContext, source: &str) -> Result<Self, RowError> {
        Ok(Self {
            proboscis: convert_infection_status(ctx.cell(PROBOSCIS)?, source)?,
            midgut: convert_infection_status(ctx.cell(MIDGUT)?, source)?,
            salivary: convert_infection_status(ctx.cell(SALIVARY)?, source)?,
        })
    }

    fn infected(&self) -> &'static str {
        aggregate_infection(&[self.proboscis, self.midgut, self.salivary])
    }
}

fn build_fly(ctx: &RowContext) -> Result<Payload, RowError> {
    let source = ctx.source();
    let tube_code = ctx.cell(TUBE_CODE)?.trim();
    let tissues = Tissues::from_row(ctx, &source)?;
    let infected = tissues.infected();

    Ok(Payload::new(&FLY)
        .set("fly_code", tube_code)
        .set("village_name", ctx.resolve_village(ctx.cell(VILLAGE_COL)?)?)
        .set("collection_number", convert_tube_code(tube_code)?)
        .set("sex", convert_sex(ctx.cell(SEX)?, &source)?)
        .set("species", convert_species(ctx.cell(SPECIES)?, &ctx.vocab.species, &source)?)
        // Dissection sheets carry no hunger-stage column
        .set("hunger_stage", convert_stage(""))
        .set("wing_fray", convert_stage(ctx.cell(WING_FRAY)?))
        .set("box_id", STAGING_BOX_ID)
        .set("infected", infected)
        .set("positive_proboscis", tissues.proboscis)
        .set("positive_midgut", tissues.midgut)
        .set("positive_salivary_gland", tissues.salivary)
        .set("tryps_by_scope", infected)
        .set("date_of_collection", convert_date(ctx.cell(DATE)?, DateShape::Date)?)
        .set("gps_coords", gps_coords(ctx.cell(LAT)?, ctx.cell(LON)?))
        .set("teneral", convert_teneral(ctx.cell(TENERAL)?, &source)?)
        .set("comments", ctx.cells.get(COMMENTS).and_then(|c| optional_text(c))))
}
