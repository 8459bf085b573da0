//! EPA fuel-economy cleaner.
//!
//! Takes the raw `vehicles.csv` (~84 columns) down to the documented column
//! set, applies the quality filters, and fans dual-fuel vehicles out into one
//! row per vehicle-fuel combination.

use anyhow::Result;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

use crate::config::DataPaths;
use crate::output::{check_columns, read_records, write_records};
use crate::records::CleanVehicle;

/// Columns the cleaner cannot run without. Checked up front so schema drift
/// fails with the column named.
const REQUIRED_COLUMNS: &[&str] = &[
    "year", "make", "model", "city08", "highway08", "comb08", "fuelType1", "id",
];

/// The subset of raw EPA columns this stage consumes. Everything else in the
/// file is ignored at deserialization.
///
/// Numeric fields are coerced leniently: a value that fails to parse becomes
/// null and falls into the quality filters. Only a missing file or a missing
/// column aborts the stage.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVehicle {
    #[serde(deserialize_with = "lenient_i32", default)]
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "VClass")]
    pub vehicle_class: Option<String>,
    #[serde(rename = "drive")]
    pub drive_type: Option<String>,
    #[serde(rename = "trany")]
    pub transmission: Option<String>,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub cylinders: Option<f64>,
    #[serde(rename = "displ", deserialize_with = "lenient_f64", default)]
    pub displacement: Option<f64>,
    #[serde(rename = "fuelType")]
    pub fuel_type: Option<String>,
    #[serde(rename = "fuelType1")]
    pub primary_fuel: Option<String>,
    #[serde(rename = "fuelType2")]
    pub secondary_fuel: Option<String>,
    #[serde(rename = "city08", deserialize_with = "lenient_f64", default)]
    pub city_mpg: Option<f64>,
    #[serde(rename = "highway08", deserialize_with = "lenient_f64", default)]
    pub highway_mpg: Option<f64>,
    #[serde(rename = "comb08", deserialize_with = "lenient_f64", default)]
    pub combined_mpg: Option<f64>,
    #[serde(rename = "co2TailpipeGpm", deserialize_with = "lenient_f64", default)]
    pub co2_gpm: Option<f64>,
    pub id: i64,
}

fn lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Deserialize::deserialize(de)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

fn lenient_i32<'de, D>(de: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Deserialize::deserialize(de)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

/// Runs the EPA cleaning stage end to end: raw file in, cleaned CSV out.
pub fn run(paths: &DataPaths) -> Result<()> {
    let raw_path = paths.raw_vehicles();
    check_columns(&raw_path, REQUIRED_COLUMNS)?;

    let raw: Vec<RawVehicle> = read_records(&raw_path)?;
    info!(records = raw.len(), "EPA raw records loaded");

    let cleaned = clean_vehicles(raw, Utc::now().year());

    let out = paths.epa_clean();
    write_records(&out, &cleaned)?;
    info!(path = %out.display(), records = cleaned.len(), "EPA cleaned output written");

    Ok(())
}

/// Applies the EPA quality filters in order and fans out dual-fuel vehicles.
///
/// Post fan-out, row count = unique vehicles + dual-fuel vehicle count: each
/// dual-fuel vehicle appears once per fuel, tagged with `fuel_rank`.
pub fn clean_vehicles(raw: Vec<RawVehicle>, current_year: i32) -> Vec<CleanVehicle> {
    let initial = raw.len();

    // Model years 2010 and later only.
    let rows: Vec<RawVehicle> = raw
        .into_iter()
        .filter(|r| r.year.is_some_and(|y| y >= 2010))
        .collect();
    info!(before = initial, after = rows.len(), "Filtered to model year 2010+");

    // Critical fields: year/make/model, and at least one MPG value.
    let before = rows.len();
    let rows: Vec<RawVehicle> = rows
        .into_iter()
        .filter(|r| r.year.is_some() && has_text(&r.make) && has_text(&r.model))
        .filter(|r| r.combined_mpg.is_some() || r.city_mpg.is_some() || r.highway_mpg.is_some())
        .collect();
    info!(before, after = rows.len(), "Dropped records missing critical fields");

    // Outliers: zero MPG, implausibly high MPG on non-electric vehicles
    // (MPGe legitimately exceeds 200 for EVs), future model years.
    let before = rows.len();
    let rows: Vec<RawVehicle> = rows
        .into_iter()
        .filter(|r| r.combined_mpg != Some(0.0))
        .filter(|r| {
            match r.combined_mpg {
                Some(mpg) if mpg > 200.0 => is_electric(&r.fuel_type),
                _ => true,
            }
        })
        .filter(|r| r.year.is_some_and(|y| y <= current_year))
        .collect();
    info!(before, after = rows.len(), "Removed outlier records");

    // Exact duplicates on the eleven-field key, first occurrence kept.
    let before = rows.len();
    let mut seen = HashSet::new();
    let rows: Vec<RawVehicle> = rows
        .into_iter()
        .filter(|r| seen.insert(dedup_key(r)))
        .collect();
    info!(before, after = rows.len(), "Removed exact duplicates");

    // Dual-fuel fan-out: every vehicle gets a primary-fuel row; vehicles with
    // a secondary fuel get a second row for it. An explicit new collection,
    // not in-place mutation.
    let unique = rows.len();
    let mut cleaned: Vec<CleanVehicle> = rows
        .iter()
        .map(|r| project(r, r.primary_fuel.clone().unwrap_or_default(), 1))
        .collect();

    let dual_fuel: Vec<CleanVehicle> = rows
        .iter()
        .filter(|r| has_text(&r.secondary_fuel))
        .map(|r| project(r, r.secondary_fuel.clone().unwrap_or_default(), 2))
        .collect();

    let dual_count = dual_fuel.len();
    cleaned.extend(dual_fuel);

    info!(
        unique_vehicles = unique,
        dual_fuel_vehicles = dual_count,
        total = cleaned.len(),
        "Fanned out dual-fuel vehicles"
    );

    cleaned
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn is_electric(fuel_type: &Option<String>) -> bool {
    fuel_type
        .as_deref()
        .is_some_and(|f| f.to_lowercase().contains("electric"))
}

fn project(r: &RawVehicle, fuel_used: String, fuel_rank: u8) -> CleanVehicle {
    CleanVehicle {
        year: r.year.unwrap_or_default(),
        make: r.make.clone().unwrap_or_default(),
        model: r.model.clone().unwrap_or_default(),
        vehicle_class: r.vehicle_class.clone(),
        drive_type: r.drive_type.clone(),
        transmission: r.transmission.clone(),
        cylinders: r.cylinders,
        displacement: r.displacement,
        fuel_type: r.fuel_type.clone(),
        primary_fuel: r.primary_fuel.clone().unwrap_or_default(),
        secondary_fuel: r.secondary_fuel.clone().filter(|s| !s.trim().is_empty()),
        city_mpg: r.city_mpg,
        highway_mpg: r.highway_mpg,
        combined_mpg: r.combined_mpg,
        co2_gpm: r.co2_gpm,
        id: r.id,
        fuel_used,
        fuel_rank,
    }
}

/// Builds the exact-match duplicate key over the eleven identifying fields.
fn dedup_key(r: &RawVehicle) -> String {
    let sep = '\u{1f}';
    let mut key = String::new();
    for part in [
        opt_num(r.year.map(f64::from)),
        r.make.clone().unwrap_or_default(),
        r.model.clone().unwrap_or_default(),
        opt_num(r.displacement),
        opt_num(r.cylinders),
        r.transmission.clone().unwrap_or_default(),
        r.drive_type.clone().unwrap_or_default(),
        r.fuel_type.clone().unwrap_or_default(),
        opt_num(r.combined_mpg),
        opt_num(r.city_mpg),
        opt_num(r.highway_mpg),
    ] {
        key.push_str(&part);
        key.push(sep);
    }
    key
}

fn opt_num(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{x}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(year: i32, make: &str, model: &str, mpg: f64) -> RawVehicle {
        RawVehicle {
            year: Some(year),
            make: Some(make.to_string()),
            model: Some(model.to_string()),
            vehicle_class: Some("Compact Cars".to_string()),
            drive_type: Some("Front-Wheel Drive".to_string()),
            transmission: Some("Automatic (AV-S6)".to_string()),
            cylinders: Some(4.0),
            displacement: Some(1.8),
            fuel_type: Some("Regular".to_string()),
            primary_fuel: Some("Regular Gasoline".to_string()),
            secondary_fuel: None,
            city_mpg: Some(mpg - 2.0),
            highway_mpg: Some(mpg + 3.0),
            combined_mpg: Some(mpg),
            co2_gpm: Some(300.0),
            id: 1,
        }
    }

    #[test]
    fn test_pre_2010_rows_dropped() {
        let rows = vec![raw(2009, "Toyota", "Corolla", 30.0), raw(2015, "Toyota", "Corolla", 32.0)];
        let cleaned = clean_vehicles(rows, 2025);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].year, 2015);
    }

    #[test]
    fn test_future_years_dropped() {
        let rows = vec![raw(2030, "Toyota", "Corolla", 30.0)];
        assert!(clean_vehicles(rows, 2025).is_empty());
    }

    #[test]
    fn test_missing_critical_fields_dropped() {
        let mut no_make = raw(2020, "Ford", "Focus", 28.0);
        no_make.make = None;
        let mut no_mpg = raw(2020, "Ford", "Focus", 28.0);
        no_mpg.city_mpg = None;
        no_mpg.highway_mpg = None;
        no_mpg.combined_mpg = None;

        assert!(clean_vehicles(vec![no_make, no_mpg], 2025).is_empty());
    }

    #[test]
    fn test_zero_mpg_dropped() {
        let rows = vec![raw(2020, "Ford", "Focus", 0.0)];
        assert!(clean_vehicles(rows, 2025).is_empty());
    }

    #[test]
    fn test_high_mpg_kept_only_for_electric() {
        let mut ev = raw(2022, "Tesla", "Model 3", 250.0);
        ev.fuel_type = Some("Electricity".to_string());
        ev.primary_fuel = Some("Electricity".to_string());
        let gas = raw(2022, "Ford", "Focus", 250.0);

        let cleaned = clean_vehicles(vec![ev, gas], 2025);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].make, "Tesla");
    }

    #[test]
    fn test_exact_duplicates_keep_first() {
        let a = raw(2020, "Honda", "Civic", 33.0);
        let mut b = a.clone();
        b.id = 2; // id is not part of the duplicate key
        let cleaned = clean_vehicles(vec![a, b], 2025);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].id, 1);
    }

    #[test]
    fn test_dual_fuel_fan_out_law() {
        let mut flex = raw(2021, "Chevrolet", "Impala", 25.0);
        flex.fuel_type = Some("Gasoline or E85".to_string());
        flex.secondary_fuel = Some("E85".to_string());
        let plain = raw(2021, "Chevrolet", "Malibu", 29.0);

        let cleaned = clean_vehicles(vec![flex, plain], 2025);
        // 2 unique vehicles + 1 dual-fuel = 3 rows
        assert_eq!(cleaned.len(), 3);

        let ranks: Vec<u8> = cleaned
            .iter()
            .filter(|v| v.model == "Impala")
            .map(|v| v.fuel_rank)
            .collect();
        assert_eq!(ranks, vec![1, 2]);

        let rank2 = cleaned.iter().find(|v| v.fuel_rank == 2).unwrap();
        assert_eq!(rank2.fuel_used, "E85");
        // The fan-out rows are otherwise identical
        assert_eq!(rank2.combined_mpg, Some(25.0));
    }

    #[test]
    fn test_malformed_numeric_field_coerces_to_null_not_error() {
        // A bad value in one numeric column is a data-quality problem for
        // that row, not a structural failure of the whole file.
        let data = "\
year,make,model,city08,highway08,comb08,fuelType1,cylinders,displ,id
2020,Toyota,Prius,N/A,50,52,Regular Gasoline,N/A,1.8,101
";
        let raw: Vec<RawVehicle> = csv::Reader::from_reader(data.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(raw[0].cylinders, None);
        assert_eq!(raw[0].city_mpg, None);
        assert_eq!(raw[0].combined_mpg, Some(52.0));

        // The row still passes cleaning on the strength of its valid fields
        let cleaned = clean_vehicles(raw, 2025);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].cylinders, None);
    }

    #[test]
    fn test_fan_out_not_deduplicated() {
        // Both fan-out rows survive even though they differ only in fuel fields
        let mut flex = raw(2021, "Ford", "F150", 20.0);
        flex.secondary_fuel = Some("Natural Gas".to_string());
        let cleaned = clean_vehicles(vec![flex], 2025);
        assert_eq!(cleaned.len(), 2);
    }
}
