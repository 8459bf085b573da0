//! EPA × NHTSA join: fuel economy against complaint history.

use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::integrate::types::VehicleComplaintRow;
use crate::normalize::normalize_key;
use crate::records::{CleanComplaint, CleanVehicle};

#[derive(Debug, Default)]
struct ComplaintAgg {
    total: u64,
    crashes: u64,
    fires: u64,
    injured: i64,
    deaths: i64,
    mileage_sum: f64,
    mileage_count: u64,
}

impl ComplaintAgg {
    fn avg_mileage(&self) -> f64 {
        if self.mileage_count == 0 {
            0.0
        } else {
            self.mileage_sum / self.mileage_count as f64
        }
    }
}

/// Left-joins vehicles to complaint aggregates on (year, make, model), with
/// make/model canonicalized on both sides.
///
/// Every input vehicle row appears in the output; vehicles with no matching
/// complaint group get zero-filled metrics rather than being dropped. Exact
/// duplicate output rows are removed, first occurrence kept. Output order
/// follows input order, so reruns over the same inputs are byte-identical.
pub fn vehicle_complaints_join(
    vehicles: &[CleanVehicle],
    complaints: &[CleanComplaint],
) -> Vec<VehicleComplaintRow> {
    // Aggregate complaints per (model year, normalized make, normalized
    // model). Null injury/death counts contribute zero; the mileage mean is
    // taken over rows that have one.
    let mut aggregates: HashMap<(i32, String, String), ComplaintAgg> = HashMap::new();
    for c in complaints {
        let key = (c.model_year, normalize_key(&c.make), normalize_key(&c.model));
        let agg = aggregates.entry(key).or_default();
        agg.total += 1;
        if c.crash {
            agg.crashes += 1;
        }
        if c.fire {
            agg.fires += 1;
        }
        agg.injured += c.injured.unwrap_or(0);
        agg.deaths += c.deaths.unwrap_or(0);
        if let Some(m) = c.mileage {
            agg.mileage_sum += m as f64;
            agg.mileage_count += 1;
        }
    }
    info!(
        complaints = complaints.len(),
        groups = aggregates.len(),
        "Aggregated complaints into vehicle groups"
    );

    // Variant counts use the raw (un-normalized) nameplate key and are
    // attached to every row of the group.
    let mut variants: HashMap<(i32, &str, &str), u64> = HashMap::new();
    for v in vehicles {
        *variants
            .entry((v.year, v.make.as_str(), v.model.as_str()))
            .or_default() += 1;
    }

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(vehicles.len());
    let mut matched = 0usize;

    for v in vehicles {
        let join_key = (v.year, normalize_key(&v.make), normalize_key(&v.model));
        let agg = aggregates.get(&join_key);
        if agg.is_some() {
            matched += 1;
        }

        let row = VehicleComplaintRow {
            year: v.year,
            make: v.make.clone(),
            model: v.model.clone(),
            vehicle_class: v.vehicle_class.clone(),
            drive_type: v.drive_type.clone(),
            cylinders: v.cylinders,
            displacement: v.displacement,
            fuel_type: v.fuel_type.clone(),
            fuel_used: v.fuel_used.clone(),
            fuel_rank: v.fuel_rank,
            city_mpg: v.city_mpg,
            highway_mpg: v.highway_mpg,
            combined_mpg: v.combined_mpg,
            co2_gpm: v.co2_gpm,
            total_complaints: agg.map_or(0, |a| a.total),
            crash_incidents: agg.map_or(0, |a| a.crashes),
            fire_incidents: agg.map_or(0, |a| a.fires),
            total_injured: agg.map_or(0, |a| a.injured),
            total_deaths: agg.map_or(0, |a| a.deaths),
            avg_complaint_mileage: agg.map_or(0.0, ComplaintAgg::avg_mileage),
            vehicle_variants: variants[&(v.year, v.make.as_str(), v.model.as_str())],
        };

        // Exact-duplicate output rows are dropped, first kept.
        if seen.insert(format!("{row:?}")) {
            rows.push(row);
        }
    }

    info!(
        records = rows.len(),
        with_complaints = matched,
        without_complaints = vehicles.len() - matched,
        "Created vehicle complaints analysis"
    );

    rows
}
