//! Row types for the three integrated analytical tables.

use serde::{Deserialize, Serialize};

use crate::normalize::FuelCode;

/// One row of `vehicle_complaints_analysis.csv`.
///
/// Grain: one row per vehicle-fuel combination (post dual-fuel fan-out),
/// annotated with complaint aggregates for its (year, make, model) group.
/// The complaint numbers are not fuel-specific, so both fuel-rank rows of a
/// dual-fuel vehicle carry identical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleComplaintRow {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub vehicle_class: Option<String>,
    pub drive_type: Option<String>,
    pub cylinders: Option<f64>,
    pub displacement: Option<f64>,
    pub fuel_type: Option<String>,
    pub fuel_used: String,
    pub fuel_rank: u8,
    pub city_mpg: Option<f64>,
    pub highway_mpg: Option<f64>,
    pub combined_mpg: Option<f64>,
    pub co2_gpm: Option<f64>,
    pub total_complaints: u64,
    pub crash_incidents: u64,
    pub fire_incidents: u64,
    pub total_injured: i64,
    pub total_deaths: i64,
    pub avg_complaint_mileage: f64,
    /// Number of trim/engine variants sharing this (year, make, model).
    pub vehicle_variants: u64,
}

/// One row of `fuel_infrastructure_analysis.csv`.
///
/// Grain: one row per (year, fuel_type_code), sorted on that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureRow {
    pub year: i32,
    pub fuel_type_code: FuelCode,
    pub vehicle_count: u64,
    pub avg_combined_mpg: Option<f64>,
    pub avg_city_mpg: Option<f64>,
    pub avg_highway_mpg: Option<f64>,
    pub total_stations: u64,
    pub available_stations: u64,
    /// `vehicle_count / max(total_stations, 1)`. A fuel type with zero
    /// stations reports the raw vehicle count as a "no infrastructure"
    /// sentinel, not a true ratio.
    pub vehicles_per_station: f64,
}

/// One row of `comprehensive_vehicle_analysis.csv`: the complaints view plus
/// a nationwide station count for the fuel actually used by the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveRow {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub vehicle_class: Option<String>,
    pub drive_type: Option<String>,
    pub cylinders: Option<f64>,
    pub displacement: Option<f64>,
    pub fuel_type: Option<String>,
    pub fuel_used: String,
    pub fuel_rank: u8,
    pub city_mpg: Option<f64>,
    pub highway_mpg: Option<f64>,
    pub combined_mpg: Option<f64>,
    pub co2_gpm: Option<f64>,
    pub total_complaints: u64,
    pub crash_incidents: u64,
    pub fire_incidents: u64,
    pub total_injured: i64,
    pub total_deaths: i64,
    pub avg_complaint_mileage: f64,
    pub vehicle_variants: u64,
    /// Mapped from `fuel_used`; empty for fuels outside the mapping.
    pub fuel_type_code: Option<FuelCode>,
    pub stations_nationwide: u64,
}

impl ComprehensiveRow {
    pub fn from_base(
        base: VehicleComplaintRow,
        fuel_type_code: Option<FuelCode>,
        stations_nationwide: u64,
    ) -> Self {
        ComprehensiveRow {
            year: base.year,
            make: base.make,
            model: base.model,
            vehicle_class: base.vehicle_class,
            drive_type: base.drive_type,
            cylinders: base.cylinders,
            displacement: base.displacement,
            fuel_type: base.fuel_type,
            fuel_used: base.fuel_used,
            fuel_rank: base.fuel_rank,
            city_mpg: base.city_mpg,
            highway_mpg: base.highway_mpg,
            combined_mpg: base.combined_mpg,
            co2_gpm: base.co2_gpm,
            total_complaints: base.total_complaints,
            crash_incidents: base.crash_incidents,
            fire_incidents: base.fire_incidents,
            total_injured: base.total_injured,
            total_deaths: base.total_deaths,
            avg_complaint_mileage: base.avg_complaint_mileage,
            vehicle_variants: base.vehicle_variants,
            fuel_type_code,
            stations_nationwide,
        }
    }
}
