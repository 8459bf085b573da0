//! End-to-end pipeline test over synthetic raw files: clean all three
//! sources, integrate, and check the analytical tables.

use auto_data_etl::config::DataPaths;
use auto_data_etl::integrate::types::{ComprehensiveRow, InfrastructureRow, VehicleComplaintRow};
use auto_data_etl::normalize::FuelCode;
use auto_data_etl::output::read_records;
use auto_data_etl::{clean, integrate};

/// Raw EPA extract with a few of the extra columns the real file carries.
const RAW_VEHICLES: &str = "\
year,make,model,VClass,drive,trany,cylinders,displ,fuelType,fuelType1,fuelType2,city08,highway08,comb08,co2TailpipeGpm,id,barrels08,charge240
2020,Toyota ,prius,Midsize Cars,Front-Wheel Drive,Automatic (AV-S6),4,1.8,Regular,Regular Gasoline,,54,50,52,158,101,9.2,0
2020,Toyota ,prius,Midsize Cars,Front-Wheel Drive,Automatic (AV-S6),4,1.8,Regular,Regular Gasoline,,54,50,52,158,999,9.2,0
2009,Ford,Focus,Compact Cars,Front-Wheel Drive,Manual 5-spd,4,2.0,Regular,Regular Gasoline,,24,33,28,320,102,12.1,0
2022,Tesla,Model 3,Midsize Cars,Rear-Wheel Drive,Automatic (A1),,,Electricity,Electricity,,138,126,250,0,103,0.1,10.5
2021,Chevrolet,Impala,Large Cars,Front-Wheel Drive,Automatic 6-spd,6,3.6,Gasoline or E85,Regular Gasoline,E85,19,28,22,400,104,14.3,0
2030,Faraday,FF91,Midsize Cars,All-Wheel Drive,Automatic (A1),,,Electricity,Electricity,,100,95,98,0,105,0.2,11.0
";

fn raw_complaint_line(odino: &str, make: &str, model: &str, year: &str, crash: &str, date: &str, fire: &str, mileage: &str) -> String {
    let mut fields = vec![""; 18];
    fields[0] = odino;
    fields[1] = odino;
    fields[2] = "Manufacturer Inc";
    fields[3] = make;
    fields[4] = model;
    fields[5] = year;
    fields[6] = crash;
    fields[7] = date;
    fields[8] = fire;
    fields[9] = "0";
    fields[10] = "0";
    fields[11] = "ENGINE";
    fields[14] = "VIN123";
    fields[17] = mileage;
    fields.join("\t")
}

const RAW_STATIONS: &str = "\
fuel_type_code,station_name,street_address,city,state,zip,latitude,longitude,status_code,access_code,open_date,ev_network,ev_connector_types,ev_pricing,id,country
ELEC,Denver Fast Charge,1 Main St,Denver,CO,80201,39.7,-105.0,E,public,2020-01-15,ChargePoint,J1772,Free,1,US
ELEC,Seattle Hub,2 Pine St,Seattle,WA,98101,47.6,-122.3,P,public,2024-06-01,,,,2,US
CNG,Denver CNG,3 Gas Rd,Denver,CO,80202,39.8,-104.9,E,public,2015-03-01,,,,3,US
GASOLINE,Conventional,4 Oil Ave,Denver,CO,80203,39.9,-104.8,E,public,2010-01-01,,,,4,US
ELEC,Null Island,5 Ocean Dr,Atlantis,XX,00000,0.0,0.0,E,public,2020-01-01,,,,5,US
";

fn setup() -> (tempfile::TempDir, DataPaths) {
    let tmp = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(tmp.path().join("data"));
    paths.ensure_layout().unwrap();

    std::fs::write(paths.raw_vehicles(), RAW_VEHICLES).unwrap();

    let complaints = [
        raw_complaint_line("1", "TOYOTA", "PRIUS", "2020", "Y", "20230401", "N", "30000"),
        // Duplicate case id, must collapse to the first occurrence
        raw_complaint_line("1", "TOYOTA", "PRIUS", "2020", "N", "20230402", "N", "99999"),
        raw_complaint_line("2", "TOYOTA", "PRIUS", "2020", "N", "20230501", "Y", "50000"),
        // Future receipt date, dropped
        raw_complaint_line("3", "TOYOTA", "PRIUS", "2020", "Y", "20990101", "N", "1000"),
    ]
    .join("\n");
    std::fs::write(paths.raw_complaints(), complaints).unwrap();

    std::fs::write(paths.raw_stations(), RAW_STATIONS).unwrap();

    (tmp, paths)
}

fn run_pipeline(paths: &DataPaths) {
    clean::epa::run(paths).unwrap();
    clean::nhtsa::run(paths).unwrap();
    clean::doe::run(paths).unwrap();
    integrate::run(paths).unwrap();
}

#[test]
fn test_full_pipeline() {
    let (_tmp, paths) = setup();
    run_pipeline(&paths);

    // EPA: 4 unique vehicles survive (pre-2010, future-year, and duplicate
    // rows dropped); the dual-fuel Impala fans out to two rows.
    let complaints_view: Vec<VehicleComplaintRow> =
        read_records(&paths.vehicle_complaints()).unwrap();
    assert_eq!(complaints_view.len(), 4);

    // "Toyota " / "prius" matches the "TOYOTA"/"PRIUS" complaint group
    // despite case and whitespace differences.
    let prius = complaints_view
        .iter()
        .find(|r| r.model == "prius")
        .unwrap();
    assert_eq!(prius.total_complaints, 2);
    assert_eq!(prius.crash_incidents, 1);
    assert_eq!(prius.fire_incidents, 1);
    assert_eq!(prius.avg_complaint_mileage, 40_000.0);

    // Unmatched vehicles are zero-filled, not dropped.
    let tesla = complaints_view
        .iter()
        .find(|r| r.make == "Tesla")
        .unwrap();
    assert_eq!(tesla.total_complaints, 0);
    assert_eq!(tesla.combined_mpg, Some(250.0)); // MPGe > 200 kept for EVs

    // Both fan-out rows of the Impala are present with the same complaint
    // numbers and the correct fuels.
    let impala: Vec<&VehicleComplaintRow> = complaints_view
        .iter()
        .filter(|r| r.model == "Impala")
        .collect();
    assert_eq!(impala.len(), 2);
    assert_eq!(impala[0].fuel_rank, 1);
    assert_eq!(impala[1].fuel_rank, 2);
    assert_eq!(impala[1].fuel_used, "E85");

    // Infrastructure: only the Tesla maps to a station code (ELEC), with
    // the Seattle station planned rather than available.
    let infrastructure: Vec<InfrastructureRow> =
        read_records(&paths.fuel_infrastructure()).unwrap();
    assert_eq!(infrastructure.len(), 1);
    let elec = &infrastructure[0];
    assert_eq!(elec.year, 2022);
    assert_eq!(elec.fuel_type_code, FuelCode::Elec);
    assert_eq!(elec.vehicle_count, 1);
    assert_eq!(elec.total_stations, 2);
    assert_eq!(elec.available_stations, 1);
    assert_eq!(elec.vehicles_per_station, 0.5);

    // Comprehensive: station counts keyed off fuel_used.
    let comprehensive: Vec<ComprehensiveRow> = read_records(&paths.comprehensive()).unwrap();
    assert_eq!(comprehensive.len(), 4);
    let tesla = comprehensive.iter().find(|r| r.make == "Tesla").unwrap();
    assert_eq!(tesla.fuel_type_code, Some(FuelCode::Elec));
    assert_eq!(tesla.stations_nationwide, 2);
    let prius = comprehensive.iter().find(|r| r.model == "prius").unwrap();
    assert_eq!(prius.fuel_type_code, None);
    assert_eq!(prius.stations_nationwide, 0);
}

#[test]
fn test_rerun_is_idempotent() {
    let (_tmp, paths) = setup();
    run_pipeline(&paths);
    let first = std::fs::read(paths.vehicle_complaints()).unwrap();

    // Every stage fully recomputes its output; a rerun over the same raw
    // inputs produces byte-identical files.
    run_pipeline(&paths);
    let second = std::fs::read(paths.vehicle_complaints()).unwrap();
    assert_eq!(first, second);

    let infra_first = std::fs::read(paths.fuel_infrastructure()).unwrap();
    run_pipeline(&paths);
    let infra_second = std::fs::read(paths.fuel_infrastructure()).unwrap();
    assert_eq!(infra_first, infra_second);
}

#[test]
fn test_missing_raw_input_aborts_stage() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(tmp.path().join("data"));
    paths.ensure_layout().unwrap();

    // No raw files written: every cleaner fails structurally.
    assert!(clean::epa::run(&paths).is_err());
    assert!(clean::nhtsa::run(&paths).is_err());
    assert!(clean::doe::run(&paths).is_err());
}
