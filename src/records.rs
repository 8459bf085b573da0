//! Cleaned record types shared between the cleaning and integration stages.
//!
//! Each struct is one row of a `data/processed/` CSV. The field order here is
//! the column order of the file, so changing it changes the output schema.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::FuelCode;

/// One cleaned EPA row: a vehicle-fuel combination.
///
/// After the dual-fuel fan-out a vehicle certified for two fuels appears
/// twice, once per fuel, distinguished by `fuel_used` and `fuel_rank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanVehicle {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub vehicle_class: Option<String>,
    pub drive_type: Option<String>,
    pub transmission: Option<String>,
    pub cylinders: Option<f64>,
    pub displacement: Option<f64>,
    /// EPA's combined fuel descriptor (e.g. "Gasoline or E85"). Used for the
    /// electric-vehicle MPGe exemption and the exact-duplicate key.
    pub fuel_type: Option<String>,
    pub primary_fuel: String,
    pub secondary_fuel: Option<String>,
    pub city_mpg: Option<f64>,
    pub highway_mpg: Option<f64>,
    pub combined_mpg: Option<f64>,
    pub co2_gpm: Option<f64>,
    pub id: i64,
    /// The fuel this row represents: primary (rank 1) or secondary (rank 2).
    pub fuel_used: String,
    pub fuel_rank: u8,
}

/// One cleaned NHTSA complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanComplaint {
    /// ODI case number, the unique business key used for deduplication.
    pub odometer_case_id: i64,
    /// Secondary identifier; nullable since only the case id is load-bearing.
    pub complaint_id: Option<i64>,
    pub manufacturer: String,
    pub make: String,
    pub model: String,
    pub model_year: i32,
    pub crash: bool,
    /// Receipt date, ISO formatted. Unparseable source dates become null.
    pub complaint_date: Option<NaiveDate>,
    pub fire: bool,
    pub injured: Option<i64>,
    pub deaths: Option<i64>,
    pub component: String,
    pub vin: String,
    pub mileage: Option<i64>,
}

/// One cleaned DOE/NREL alternative-fuel station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanStation {
    pub fuel_type_code: FuelCode,
    pub station_name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status_code: String,
    pub access_code: Option<String>,
    pub open_date: Option<String>,
    pub ev_network: Option<String>,
    pub ev_connector_types: Option<String>,
    pub ev_pricing: Option<String>,
    pub id: i64,
}
