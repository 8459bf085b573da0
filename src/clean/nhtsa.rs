//! NHTSA complaints cleaner.
//!
//! The raw file is tab-separated with no header row; fields are selected by
//! position. That positional layout is a contractual property of the upstream
//! format, so it is reproduced exactly here, and the column count of every
//! row is validated before any index is touched.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::config::DataPaths;
use crate::output::write_records;
use crate::records::CleanComplaint;

/// Raw positions consumed from each tab-separated row, in output order:
/// ODINO, CMPLID, MFGTXT, MAKETXT, MODELTXT, YEARTXT, CRASH, DATEA, FIRE,
/// INJURED, DEATHS, COMPDESC, VIN, MILEAGE.
const FIELD_POSITIONS: [usize; 14] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 14, 17];

/// A row must carry at least this many fields for every selected position to
/// exist. Shorter (ragged) rows are dropped and counted, never indexed.
const MIN_COLUMNS: usize = 18;

const MAX_MILEAGE: f64 = 1_000_000.0;

/// One raw complaint row, all fields still text.
#[derive(Debug, Clone)]
pub struct RawComplaint {
    pub odino: String,
    pub cmplid: String,
    pub manufacturer: String,
    pub make: String,
    pub model: String,
    pub model_year: String,
    pub crash: String,
    pub date_received: String,
    pub fire: String,
    pub injured: String,
    pub deaths: String,
    pub component: String,
    pub vin: String,
    pub mileage: String,
}

/// Runs the NHTSA cleaning stage end to end.
pub fn run(paths: &DataPaths) -> Result<()> {
    let raw = read_raw(&paths.raw_complaints())?;
    info!(records = raw.len(), "NHTSA raw records loaded");

    let today = Utc::now().date_naive();
    let cleaned = clean_complaints(raw, today, today.year());

    let out = paths.nhtsa_clean();
    write_records(&out, &cleaned)?;
    info!(path = %out.display(), records = cleaned.len(), "NHTSA cleaned output written");

    Ok(())
}

/// Reads the headerless tab-separated complaints file.
pub fn read_raw(path: &Path) -> Result<Vec<RawComplaint>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening input file {}", path.display()))?;

    let mut rows = Vec::new();
    let mut short_rows = 0usize;

    for result in reader.records() {
        let record = result.with_context(|| format!("reading record from {}", path.display()))?;
        if record.len() < MIN_COLUMNS {
            short_rows += 1;
            continue;
        }

        let field = |pos: usize| record.get(FIELD_POSITIONS[pos]).unwrap_or("").to_string();
        rows.push(RawComplaint {
            odino: field(0),
            cmplid: field(1),
            manufacturer: field(2),
            make: field(3),
            model: field(4),
            model_year: field(5),
            crash: field(6),
            date_received: field(7),
            fire: field(8),
            injured: field(9),
            deaths: field(10),
            component: field(11),
            vin: field(12),
            mileage: field(13),
        });
    }

    if short_rows > 0 {
        warn!(short_rows, "Dropped rows with too few columns");
    }

    Ok(rows)
}

/// Applies the complaint quality rules.
///
/// Numeric coercion failures become null rather than errors; null dates and
/// mileages are treated as "not an outlier" and pass the range filters.
pub fn clean_complaints(
    raw: Vec<RawComplaint>,
    today: NaiveDate,
    current_year: i32,
) -> Vec<CleanComplaint> {
    let initial = raw.len();

    // Critical text fields must be present.
    let rows: Vec<RawComplaint> = raw
        .into_iter()
        .filter(|r| {
            !r.odino.trim().is_empty()
                && !r.date_received.trim().is_empty()
                && !r.model_year.trim().is_empty()
                && !r.make.trim().is_empty()
                && !r.model.trim().is_empty()
        })
        .collect();
    info!(before = initial, after = rows.len(), "Dropped records missing critical fields");

    // Coerce and filter outliers. The case id and model year must parse to
    // numbers to be usable downstream; everything else degrades to null.
    let before = rows.len();
    let mut coerced: Vec<CleanComplaint> = Vec::with_capacity(rows.len());
    for r in rows {
        let (Some(odometer_case_id), Some(model_year)) =
            (parse_int(&r.odino), parse_int(&r.model_year))
        else {
            continue;
        };
        let complaint_id = parse_int(&r.cmplid);

        let complaint_date = parse_date(&r.date_received);
        let mileage = r.mileage.trim().parse::<f64>().ok();

        // Null dates/mileages pass; only confirmed out-of-range values drop.
        if complaint_date.is_some_and(|d| d > today) {
            continue;
        }
        if mileage.is_some_and(|m| m > MAX_MILEAGE) {
            continue;
        }
        let model_year = model_year as i32;
        if model_year > current_year {
            continue;
        }

        coerced.push(CleanComplaint {
            odometer_case_id,
            complaint_id,
            manufacturer: r.manufacturer,
            make: r.make,
            model: r.model,
            model_year,
            crash: r.crash == "Y",
            complaint_date,
            fire: r.fire == "Y",
            injured: parse_int(&r.injured),
            deaths: parse_int(&r.deaths),
            component: r.component,
            vin: r.vin,
            mileage: mileage.map(|m| m as i64),
        });
    }
    info!(before, after = coerced.len(), "Coerced types and removed outliers");

    // The case id is the unique business key; first occurrence wins.
    let before = coerced.len();
    let mut seen = HashSet::new();
    let deduped: Vec<CleanComplaint> = coerced
        .into_iter()
        .filter(|c| seen.insert(c.odometer_case_id))
        .collect();
    info!(before, after = deduped.len(), "Removed duplicate case ids");

    deduped
}

/// Parses a `YYYYMMDD` digit string. Anything unparseable becomes null.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d").ok()
}

/// Lenient integer coercion: accepts plain integers and float renderings
/// like `"2015.0"`. Failure is null, never an error.
fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
}
