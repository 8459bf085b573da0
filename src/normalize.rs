//! Join-key canonicalization shared by every cross-dataset join.
//!
//! Two concerns live here: free-text make/model normalization, and the fixed
//! EPA-to-DOE fuel vocabulary mapping. EPA labels fuels with descriptive
//! strings while DOE keys stations with short codes, so this mapping is the
//! semantic bridge between the vehicle and station datasets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonicalizes a free-text join key: trims whitespace, uppercases.
///
/// Applied identically to both sides of a join, so two strings differing only
/// in case or surrounding whitespace normalize identically. No fuzzy matching
/// is attempted; spelling variants stay unmatched and zero-fill.
pub fn normalize_key(s: &str) -> String {
    s.trim().to_uppercase()
}

/// DOE fuel type codes, as used by the NREL station dataset.
///
/// Variant order matches the lexicographic order of the codes, so sorted
/// containers keyed by `FuelCode` iterate the same way the codes sort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum FuelCode {
    Bd,
    Cng,
    E85,
    Elec,
    Hy,
    Lng,
    Lpg,
}

impl FuelCode {
    /// Parses a DOE station code (e.g. `"ELEC"`). Unknown codes map to `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "BD" => Some(FuelCode::Bd),
            "CNG" => Some(FuelCode::Cng),
            "E85" => Some(FuelCode::E85),
            "ELEC" => Some(FuelCode::Elec),
            "HY" => Some(FuelCode::Hy),
            "LNG" => Some(FuelCode::Lng),
            "LPG" => Some(FuelCode::Lpg),
            _ => None,
        }
    }

    /// Maps an EPA descriptive fuel string to a DOE station code.
    ///
    /// The mapping is many-to-one: "CNG" and "Gasoline or natural gas" both
    /// land on CNG. "Diesel" maps to BD (biodiesel), a known approximation
    /// carried over from the source data model. Anything else is unmapped and
    /// falls out of station joins as a zero-fill, not an error.
    pub fn from_epa_fuel(fuel: &str) -> Option<Self> {
        match fuel {
            "Electricity" => Some(FuelCode::Elec),
            "Gasoline or E85" => Some(FuelCode::E85),
            "CNG" => Some(FuelCode::Cng),
            "Diesel" => Some(FuelCode::Bd),
            "Hydrogen" => Some(FuelCode::Hy),
            "Gasoline or natural gas" => Some(FuelCode::Cng),
            "LPG" => Some(FuelCode::Lpg),
            "LNG" => Some(FuelCode::Lng),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelCode::Bd => "BD",
            FuelCode::Cng => "CNG",
            FuelCode::E85 => "E85",
            FuelCode::Elec => "ELEC",
            FuelCode::Hy => "HY",
            FuelCode::Lng => "LNG",
            FuelCode::Lpg => "LPG",
        }
    }

    /// `true` for codes the station dataset keeps after cleaning.
    ///
    /// LPG is a valid vehicle fuel code but not part of the alternative-fuel
    /// station set, so LPG vehicles always see zero stations.
    pub fn is_station_fuel(&self) -> bool {
        !matches!(self, FuelCode::Lpg)
    }
}

impl fmt::Display for FuelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
