//! Data directory layout and file naming.
//!
//! Every stage reads and writes fixed relative paths under one data root:
//! `raw/` for acquired files, `processed/` for cleaned tables, `integrated/`
//! for the joined analytical tables. The root defaults to `data/` and can be
//! overridden with the `DATA_DIR` environment variable.

use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads the root from `DATA_DIR`, falling back to `data/`.
    pub fn from_env() -> Self {
        let root = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        Self::new(root)
    }

    /// Creates the raw/processed/integrated directory layout.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [self.raw_dir(), self.processed_dir(), self.integrated_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn integrated_dir(&self) -> PathBuf {
        self.root.join("integrated")
    }

    // Raw inputs, as delivered by the acquisition stage.

    pub fn raw_vehicles(&self) -> PathBuf {
        self.raw_dir().join("vehicles.csv")
    }

    pub fn raw_complaints(&self) -> PathBuf {
        self.raw_dir().join("COMPLAINTS_RECEIVED_2020-2024.txt")
    }

    pub fn raw_stations(&self) -> PathBuf {
        self.raw_dir().join("alt_fuel_stations.csv")
    }

    // Cleaned outputs, one per source.

    pub fn epa_clean(&self) -> PathBuf {
        self.processed_dir().join("epa_vehicles_clean.csv")
    }

    pub fn nhtsa_clean(&self) -> PathBuf {
        self.processed_dir().join("nhtsa_complaints_clean.csv")
    }

    pub fn doe_clean(&self) -> PathBuf {
        self.processed_dir().join("doe_fuel_stations_clean.csv")
    }

    // Integrated analytical tables.

    pub fn vehicle_complaints(&self) -> PathBuf {
        self.integrated_dir().join("vehicle_complaints_analysis.csv")
    }

    pub fn fuel_infrastructure(&self) -> PathBuf {
        self.integrated_dir().join("fuel_infrastructure_analysis.csv")
    }

    pub fn comprehensive(&self) -> PathBuf {
        self.integrated_dir()
            .join("comprehensive_vehicle_analysis.csv")
    }
}

impl AsRef<Path> for DataPaths {
    fn as_ref(&self) -> &Path {
        &self.root
    }
}
