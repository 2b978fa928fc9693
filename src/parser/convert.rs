//! Field converters: raw worksheet cells to canonical values

use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::record::SqlValue;
use crate::error::ConvertError;
use crate::vocab::{self, SpeciesTable, NEGATIVE, NOT_DISSECTED, POSITIVE, STAGE_VALUES};

static DIGIT_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

fn digit_runs(raw: &str) -> impl Iterator<Item = &str> {
    DIGIT_RUNS.find_iter(raw).map(|m| m.as_str())
}

// =============================================================================
// Dates
// =============================================================================

/// Output form for [`convert_date`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `YYYY-MM-DD` text
    Iso,
    /// Structured calendar date
    Date,
}

impl FromStr for DateShape {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iso" | "YYYY-MM-DD" => Ok(DateShape::Iso),
            "date" | "datetime.date" => Ok(DateShape::Date),
            other => Err(ConvertError::InvalidArgument(format!(
                "'{}' is not a valid date shape (expected iso, YYYY-MM-DD, date or datetime.date)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Iso(String),
    Date(NaiveDate),
}

impl From<DateValue> for SqlValue {
    fn from(value: DateValue) -> Self {
        match value {
            DateValue::Iso(s) => SqlValue::Text(s),
            DateValue::Date(d) => SqlValue::Date(d),
        }
    }
}

/// Two-digit years 00-68 land in the 2000s, 69-99 in the 1900s
fn expand_year(year: i32) -> i32 {
    match year {
        0..=68 => year + 2000,
        69..=99 => year + 1900,
        _ => year,
    }
}

/// Parse day/month/year text such as `05/12/14`, `'5/1/99` or `5-1-2014`
pub fn parse_day_month_year(raw: &str) -> Result<NaiveDate, ConvertError> {
    let trimmed = raw.trim().trim_start_matches('\'');
    let malformed = || ConvertError::MalformedDate(raw.to_string());

    let parts: Vec<u32> = digit_runs(trimmed)
        .take(3)
        .map(|run| run.parse::<u32>().map_err(|_| malformed()))
        .collect::<Result<_, _>>()?;

    let [day, month, year] = parts[..] else {
        return Err(malformed());
    };

    let year = i32::try_from(year).map_err(|_| malformed())?;
    NaiveDate::from_ymd_opt(expand_year(year), month, day).ok_or_else(malformed)
}

pub fn convert_date(raw: &str, shape: DateShape) -> Result<DateValue, ConvertError> {
    let date = parse_day_month_year(raw)?;

    Ok(match shape {
        DateShape::Iso => DateValue::Iso(date.format("%Y-%m-%d").to_string()),
        DateShape::Date => DateValue::Date(date),
    })
}

// =============================================================================
// Codes and numbers
// =============================================================================

/// Collection number: the last run of digits in a tube code
pub fn convert_tube_code(raw: &str) -> Result<i64, ConvertError> {
    let last = digit_runs(raw)
        .last()
        .ok_or_else(|| ConvertError::NoDigits(raw.to_string()))?;

    last.parse().map_err(|_| ConvertError::InvalidNumber {
        value: last.to_string(),
        expected: "collection number",
    })
}

/// Integer cell; spreadsheet exports often render whole numbers as `3.0`
pub fn convert_integer(raw: &str) -> Result<i64, ConvertError> {
    let trimmed = raw.trim();
    let invalid = || ConvertError::InvalidNumber {
        value: raw.to_string(),
        expected: "integer",
    };

    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }

    let value: f64 = trimmed.parse().map_err(|_| invalid())?;
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&value);
    if value.fract() == 0.0 && in_range {
        Ok(value as i64)
    } else {
        Err(invalid())
    }
}

/// Optional real-valued cell; blank cells are `None`
pub fn convert_real(raw: &str) -> Result<Option<f64>, ConvertError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ConvertError::InvalidNumber {
            value: raw.to_string(),
            expected: "number",
        })
}

/// Blank cells become `None`
pub fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn gps_coords(lat: &str, lon: &str) -> String {
    format!("{}:{}", lat.trim(), lon.trim())
}

// =============================================================================
// Controlled vocabularies
// =============================================================================

pub fn convert_species(
    raw: &str,
    species: &SpeciesTable,
    context: &str,
) -> Result<&'static str, ConvertError> {
    species
        .lookup(raw)
        .ok_or_else(|| ConvertError::Unrecognized {
            kind: "species",
            value: raw.to_string(),
            context: context.to_string(),
        })
}

pub fn convert_sex(raw: &str, context: &str) -> Result<&'static str, ConvertError> {
    match raw.trim().to_uppercase().as_str() {
        "M" | "MALE" => Ok("M"),
        "F" | "FEMALE" => Ok("F"),
        _ => Err(ConvertError::Unrecognized {
            kind: "sex",
            value: raw.to_string(),
            context: context.to_string(),
        }),
    }
}

pub fn convert_teneral(raw: &str, context: &str) -> Result<bool, ConvertError> {
    match raw.trim().to_uppercase().as_str() {
        "T" => Ok(true),
        "NT" => Ok(false),
        _ => Err(ConvertError::Unrecognized {
            kind: "teneral status",
            value: raw.to_string(),
            context: context.to_string(),
        }),
    }
}

/// Hunger stage and wing fray: `1`-`4` pass through, anything else is `NA`
pub fn convert_stage(raw: &str) -> &'static str {
    let trimmed = raw.trim();
    STAGE_VALUES
        .iter()
        .skip(1)
        .find(|&&stage| stage == trimmed)
        .copied()
        .unwrap_or("NA")
}

pub fn convert_infection_status(raw: &str, context: &str) -> Result<&'static str, ConvertError> {
    vocab::infection_status(raw).ok_or_else(|| ConvertError::Unrecognized {
        kind: "infection status",
        value: raw.to_string(),
        context: context.to_string(),
    })
}

/// Positive wins over not dissected, which wins over negative
pub fn aggregate_infection(tissues: &[&str]) -> &'static str {
    if tissues.contains(&POSITIVE) {
        POSITIVE
    } else if tissues.contains(&NOT_DISSECTED) {
        NOT_DISSECTED
    } else {
        NEGATIVE
    }
}
