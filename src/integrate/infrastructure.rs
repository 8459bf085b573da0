//! EPA × DOE join: vehicle counts against fuel station availability.

use std::collections::BTreeMap;
use tracing::info;

use crate::integrate::types::InfrastructureRow;
use crate::normalize::FuelCode;
use crate::records::{CleanStation, CleanVehicle};

#[derive(Debug, Default)]
struct VehicleAgg {
    count: u64,
    combined: MeanAcc,
    city: MeanAcc,
    highway: MeanAcc,
}

#[derive(Debug, Default)]
struct MeanAcc {
    sum: f64,
    count: u64,
}

impl MeanAcc {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.count += 1;
        }
    }

    /// Mean over present values, rounded to one decimal. Null if nothing
    /// was present.
    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(round1(self.sum / self.count as f64))
        }
    }
}

/// Aggregates vehicles to (year, fuel code) grain, stations to nationwide
/// per-code totals, and left-joins the two on the fuel code.
///
/// Vehicles whose primary fuel has no DOE mapping fall out of the aggregate
/// (not an error). A fuel code with no stations zero-fills and reports
/// `vehicles_per_station == vehicle_count`, the "no infrastructure"
/// sentinel. Output is sorted by (year, fuel_type_code).
pub fn fuel_infrastructure_join(
    vehicles: &[CleanVehicle],
    stations: &[CleanStation],
) -> Vec<InfrastructureRow> {
    // Vehicle aggregate keyed by (year, code); the BTreeMap drives the
    // sorted output order.
    let mut vehicle_aggs: BTreeMap<(i32, FuelCode), VehicleAgg> = BTreeMap::new();
    let mut unmapped = 0usize;
    for v in vehicles {
        let Some(code) = FuelCode::from_epa_fuel(&v.primary_fuel) else {
            unmapped += 1;
            continue;
        };
        let agg = vehicle_aggs.entry((v.year, code)).or_default();
        agg.count += 1;
        agg.combined.push(v.combined_mpg);
        agg.city.push(v.city_mpg);
        agg.highway.push(v.highway_mpg);
    }

    // Station counts per (code, state), then rolled up across states.
    let mut per_state: BTreeMap<(FuelCode, String), (u64, u64)> = BTreeMap::new();
    for s in stations {
        let key = (s.fuel_type_code, s.state.clone().unwrap_or_default());
        let counts = per_state.entry(key).or_default();
        counts.0 += 1;
        if s.status_code == "E" {
            counts.1 += 1;
        }
    }
    let mut per_code: BTreeMap<FuelCode, (u64, u64)> = BTreeMap::new();
    for ((code, _state), (total, available)) in per_state {
        let counts = per_code.entry(code).or_default();
        counts.0 += total;
        counts.1 += available;
    }

    let rows: Vec<InfrastructureRow> = vehicle_aggs
        .into_iter()
        .map(|((year, code), agg)| {
            let (total_stations, available_stations) =
                per_code.get(&code).copied().unwrap_or((0, 0));
            let vehicles_per_station =
                round1(agg.count as f64 / total_stations.max(1) as f64);

            InfrastructureRow {
                year,
                fuel_type_code: code,
                vehicle_count: agg.count,
                avg_combined_mpg: agg.combined.mean(),
                avg_city_mpg: agg.city.mean(),
                avg_highway_mpg: agg.highway.mean(),
                total_stations,
                available_stations,
                vehicles_per_station,
            }
        })
        .collect();

    info!(
        records = rows.len(),
        unmapped_vehicles = unmapped,
        "Created fuel infrastructure analysis"
    );

    rows
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
