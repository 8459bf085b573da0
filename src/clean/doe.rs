//! DOE/NREL alternative-fuel station cleaner.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

use crate::config::DataPaths;
use crate::normalize::FuelCode;
use crate::output::{check_columns, read_records, write_records};
use crate::records::CleanStation;

const REQUIRED_COLUMNS: &[&str] = &[
    "fuel_type_code",
    "latitude",
    "longitude",
    "status_code",
    "id",
];

// Continental US plus Alaska and Hawaii. A deliberately rough box for
// catching coordinate entry errors, not a precise geofence.
const LAT_RANGE: (f64, f64) = (18.0, 72.0);
const LON_RANGE: (f64, f64) = (-180.0, -65.0);

/// The subset of raw NREL columns this stage consumes (~76 in the file).
#[derive(Debug, Clone, Deserialize)]
pub struct RawStation {
    pub fuel_type_code: Option<String>,
    pub station_name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status_code: Option<String>,
    pub access_code: Option<String>,
    pub open_date: Option<String>,
    pub ev_network: Option<String>,
    pub ev_connector_types: Option<String>,
    pub ev_pricing: Option<String>,
    pub id: Option<i64>,
}

/// Runs the DOE cleaning stage end to end.
pub fn run(paths: &DataPaths) -> Result<()> {
    let raw_path = paths.raw_stations();
    check_columns(&raw_path, REQUIRED_COLUMNS)?;

    let raw: Vec<RawStation> = read_records(&raw_path)?;
    info!(records = raw.len(), "DOE raw records loaded");

    let cleaned = clean_stations(raw);

    let out = paths.doe_clean();
    write_records(&out, &cleaned)?;
    info!(path = %out.display(), records = cleaned.len(), "DOE cleaned output written");

    Ok(())
}

/// Applies the station quality filters and restricts the dataset to the
/// alternative-fuel code set (conventional-fuel stations are discarded).
pub fn clean_stations(raw: Vec<RawStation>) -> Vec<CleanStation> {
    let initial = raw.len();

    // Critical fields: coordinates, fuel code, status, and the station id
    // (the dedup key).
    let rows: Vec<RawStation> = raw
        .into_iter()
        .filter(|r| {
            r.latitude.is_some()
                && r.longitude.is_some()
                && r.fuel_type_code.as_deref().is_some_and(|s| !s.is_empty())
                && r.status_code.as_deref().is_some_and(|s| !s.is_empty())
                && r.id.is_some()
        })
        .collect();
    info!(before = initial, after = rows.len(), "Dropped records missing critical fields");

    // Coordinate outliers: outside the US bounding box, or exactly (0,0).
    let before = rows.len();
    let rows: Vec<RawStation> = rows
        .into_iter()
        .filter(|r| {
            let (lat, lon) = (r.latitude.unwrap_or_default(), r.longitude.unwrap_or_default());
            lat >= LAT_RANGE.0
                && lat <= LAT_RANGE.1
                && lon >= LON_RANGE.0
                && lon <= LON_RANGE.1
                && !(lat == 0.0 && lon == 0.0)
        })
        .collect();
    info!(before, after = rows.len(), "Removed coordinate outliers");

    // Station ids are unique in the NREL dataset; first occurrence wins.
    let before = rows.len();
    let mut seen = HashSet::new();
    let rows: Vec<RawStation> = rows
        .into_iter()
        .filter(|r| seen.insert(r.id.unwrap_or_default()))
        .collect();
    info!(before, after = rows.len(), "Removed duplicate station ids");

    // Keep only the alternative-fuel set. Unknown or conventional codes
    // (and LPG, which the station set does not carry) drop out here.
    let before = rows.len();
    let cleaned: Vec<CleanStation> = rows
        .into_iter()
        .filter_map(|r| {
            let code = FuelCode::from_code(r.fuel_type_code.as_deref()?)?;
            if !code.is_station_fuel() {
                return None;
            }
            Some(CleanStation {
                fuel_type_code: code,
                station_name: r.station_name,
                street_address: r.street_address,
                city: r.city,
                state: r.state,
                zip: r.zip,
                latitude: r.latitude.unwrap_or_default(),
                longitude: r.longitude.unwrap_or_default(),
                status_code: r.status_code.unwrap_or_default(),
                access_code: r.access_code,
                open_date: r.open_date,
                ev_network: r.ev_network,
                ev_connector_types: r.ev_connector_types,
                ev_pricing: r.ev_pricing,
                id: r.id.unwrap_or_default(),
            })
        })
        .collect();
    info!(before, after = cleaned.len(), "Filtered to alternative fuel types");

    cleaned
}
