//! Three-way view: the complaints analysis widened with nationwide station
//! counts for the fuel each row actually uses.

use std::collections::BTreeMap;
use tracing::info;

use crate::integrate::types::{ComprehensiveRow, VehicleComplaintRow};
use crate::normalize::FuelCode;
use crate::records::CleanStation;

/// Left-joins the complaints analysis to nationwide station totals.
///
/// The fuel code is mapped from `fuel_used`, so the two fan-out rows of a
/// dual-fuel vehicle can land on different codes. Rows whose fuel has no
/// mapping carry an empty code and zero stations.
pub fn comprehensive_join(
    base: &[VehicleComplaintRow],
    stations: &[CleanStation],
) -> Vec<ComprehensiveRow> {
    let mut nationwide: BTreeMap<FuelCode, u64> = BTreeMap::new();
    for s in stations {
        *nationwide.entry(s.fuel_type_code).or_default() += 1;
    }

    let rows: Vec<ComprehensiveRow> = base
        .iter()
        .map(|row| {
            let code = FuelCode::from_epa_fuel(&row.fuel_used);
            let stations_nationwide = code
                .and_then(|c| nationwide.get(&c))
                .copied()
                .unwrap_or(0);
            ComprehensiveRow::from_base(row.clone(), code, stations_nationwide)
        })
        .collect();

    info!(records = rows.len(), "Created comprehensive analysis");
    rows
}
