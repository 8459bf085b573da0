//! Post-integration validation.
//!
//! Structural and semantic sanity checks over the three integrated tables.
//! The stage collects every problem it finds and reports them all before
//! failing, so a single run surfaces the full list rather than the first hit.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::DataPaths;

/// Year bounds for the primary table. The lower bound is the pipeline's
/// temporal filter; the upper bound is the documented data horizon.
const YEAR_RANGE: (i32, i32) = (2010, 2025);

/// Expectations for one integrated file.
#[derive(Debug)]
pub struct FileSpec {
    pub path: PathBuf,
    pub required_columns: Vec<&'static str>,
    pub min_rows: usize,
}

/// Runs all checks with the documented expectations. Fails (after reporting
/// everything) if any check found a problem.
pub fn run(paths: &DataPaths) -> Result<()> {
    let specs = vec![
        FileSpec {
            path: paths.vehicle_complaints(),
            required_columns: vec!["year", "make", "model", "combined_mpg", "total_complaints"],
            // ~21k vehicle-fuel combinations expected after the fan-out
            min_rows: 20_000,
        },
        FileSpec {
            path: paths.fuel_infrastructure(),
            required_columns: vec!["year", "fuel_type_code", "vehicle_count", "total_stations"],
            // Small table: fuel types by year
            min_rows: 30,
        },
        FileSpec {
            path: paths.comprehensive(),
            required_columns: vec![
                "year",
                "make",
                "model",
                "combined_mpg",
                "total_complaints",
                "stations_nationwide",
            ],
            min_rows: 20_000,
        },
    ];

    let mut issues = Vec::new();
    for spec in &specs {
        check_file(spec, &mut issues);
    }
    check_vehicle_quality(&paths.vehicle_complaints(), &mut issues);

    if issues.is_empty() {
        info!("All validation checks passed");
        return Ok(());
    }

    for issue in &issues {
        error!(issue, "Validation problem");
    }
    bail!("validation failed with {} problem(s)", issues.len());
}

/// Structural checks: file exists, required columns present, minimum row
/// count met. Problems are appended to `issues`, never raised mid-check.
pub fn check_file(spec: &FileSpec, issues: &mut Vec<String>) {
    let path_display = spec.path.display().to_string();

    let mut reader = match csv::Reader::from_path(&spec.path) {
        Ok(r) => r,
        Err(_) => {
            issues.push(format!("missing file: {path_display}"));
            return;
        }
    };

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            issues.push(format!("{path_display}: unreadable header ({e})"));
            return;
        }
    };

    let missing: Vec<&str> = spec
        .required_columns
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect();
    if !missing.is_empty() {
        issues.push(format!("{path_display}: missing columns {missing:?}"));
    }

    let rows = reader.records().filter_map(|r| r.ok()).count();
    if rows < spec.min_rows {
        issues.push(format!(
            "{path_display}: only {rows} rows (expected at least {})",
            spec.min_rows
        ));
    } else {
        info!(path = %path_display, rows, "File check passed");
    }
}

/// Semantic checks on the primary table: year range, positive MPG, and no
/// null key fields.
pub fn check_vehicle_quality(path: &Path, issues: &mut Vec<String>) {
    let result = (|| -> Result<()> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let headers = reader.headers()?.clone();

        let col = |name: &str| headers.iter().position(|h| h == name);
        let (Some(year_ix), Some(make_ix), Some(model_ix), Some(mpg_ix)) = (
            col("year"),
            col("make"),
            col("model"),
            col("combined_mpg"),
        ) else {
            // Missing columns were already reported by the structural check.
            return Ok(());
        };

        let mut year_bounds: Option<(i32, i32)> = None;
        let mut bad_mpg = 0usize;
        let mut null_year = 0usize;
        let mut null_make = 0usize;
        let mut null_model = 0usize;

        for record in reader.records() {
            let record = record?;
            let field = |ix: usize| record.get(ix).unwrap_or("").trim();

            match field(year_ix).parse::<i32>() {
                Ok(y) => {
                    year_bounds = Some(match year_bounds {
                        Some((lo, hi)) => (lo.min(y), hi.max(y)),
                        None => (y, y),
                    });
                }
                Err(_) => null_year += 1,
            }

            if let Ok(mpg) = field(mpg_ix).parse::<f64>() {
                if mpg <= 0.0 {
                    bad_mpg += 1;
                }
            }

            if field(make_ix).is_empty() {
                null_make += 1;
            }
            if field(model_ix).is_empty() {
                null_model += 1;
            }
        }

        if let Some((lo, hi)) = year_bounds {
            if lo < YEAR_RANGE.0 || hi > YEAR_RANGE.1 {
                issues.push(format!("year out of range: {lo}-{hi}"));
            }
        }
        if bad_mpg > 0 {
            issues.push(format!("{bad_mpg} vehicles with combined MPG <= 0"));
        }
        for (count, name) in [(null_year, "year"), (null_make, "make"), (null_model, "model")] {
            if count > 0 {
                issues.push(format!("{count} null values in {name}"));
            }
        }
        Ok(())
    })();

    if let Err(e) = result {
        issues.push(format!("quality checks on {} failed: {e:#}", path.display()));
    }
}
