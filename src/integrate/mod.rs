//! Integration stage: joins the three cleaned tables into three analytical
//! views.
//!
//! Each join is a pure function over in-memory record vectors; this module
//! wires them to the cleaned CSV inputs and the integrated CSV outputs.

pub mod comprehensive;
pub mod complaints;
pub mod infrastructure;
pub mod types;

use anyhow::Result;
use tracing::info;

use crate::config::DataPaths;
use crate::output::{read_records, write_records};
use crate::records::{CleanComplaint, CleanStation, CleanVehicle};

pub use complaints::vehicle_complaints_join;
pub use comprehensive::comprehensive_join;
pub use infrastructure::fuel_infrastructure_join;

/// Runs the integration stage: reads the three cleaned tables, produces the
/// three integrated tables, writes them out.
pub fn run(paths: &DataPaths) -> Result<()> {
    let vehicles: Vec<CleanVehicle> = read_records(&paths.epa_clean())?;
    let complaints: Vec<CleanComplaint> = read_records(&paths.nhtsa_clean())?;
    let stations: Vec<CleanStation> = read_records(&paths.doe_clean())?;
    info!(
        vehicles = vehicles.len(),
        complaints = complaints.len(),
        stations = stations.len(),
        "Cleaned datasets loaded"
    );

    let vehicle_complaints = vehicle_complaints_join(&vehicles, &complaints);
    write_records(&paths.vehicle_complaints(), &vehicle_complaints)?;

    let infrastructure = fuel_infrastructure_join(&vehicles, &stations);
    write_records(&paths.fuel_infrastructure(), &infrastructure)?;

    let comprehensive = comprehensive_join(&vehicle_complaints, &stations);
    write_records(&paths.comprehensive(), &comprehensive)?;

    info!("Integration complete: 3 analytical tables written");
    Ok(())
}
