//! Raw dataset acquisition: the thin I/O front of the pipeline.
//!
//! Downloads the three public sources into `data/raw/`. EPA and NHTSA ship
//! zip archives; the DOE station list comes straight from the NREL API as
//! CSV, authenticated with `NREL_API_KEY`. Any failure here is structural
//! and aborts the stage.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use zip::ZipArchive;

use crate::config::DataPaths;
use crate::fetch::{BasicClient, UrlParam, fetch_bytes};

const EPA_URL: &str = "https://www.fueleconomy.gov/feg/epadata/vehicles.csv.zip";
const NHTSA_URL: &str = "https://static.nhtsa.gov/odi/ffdd/cmpl/COMPLAINTS_RECEIVED_2020-2024.zip";
const NREL_URL: &str = "https://developer.nrel.gov/api/alt-fuel-stations/v1.csv";

/// Downloads all three raw datasets.
pub async fn run(paths: &DataPaths) -> Result<()> {
    paths.ensure_layout()?;
    let client = BasicClient::new();

    info!(url = EPA_URL, "Downloading EPA fuel economy data");
    let bytes = fetch_bytes(&client, EPA_URL).await?;
    extract_entry(&bytes, "vehicles.csv", &paths.raw_vehicles())?;

    info!(url = NHTSA_URL, "Downloading NHTSA complaints data");
    let bytes = fetch_bytes(&client, NHTSA_URL).await?;
    extract_entry(&bytes, ".txt", &paths.raw_complaints())?;

    let api_key = std::env::var("NREL_API_KEY")
        .context("NREL_API_KEY must be set for DOE station acquisition")?;
    let keyed = UrlParam {
        inner: client,
        param_name: "api_key".to_string(),
        key: api_key,
    };
    info!(url = NREL_URL, "Downloading DOE station data");
    let bytes = fetch_bytes(&keyed, NREL_URL).await?;
    let dest = paths.raw_stations();
    std::fs::write(&dest, &bytes)
        .with_context(|| format!("writing {}", dest.display()))?;
    info!(path = %dest.display(), bytes = bytes.len(), "DOE station data saved");

    Ok(())
}

/// Extracts the first archive entry whose name ends with `name_suffix` into
/// `dest`.
fn extract_entry(archive_bytes: &[u8], name_suffix: &str, dest: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(std::io::Cursor::new(archive_bytes))
        .context("reading zip archive")?;

    let index = (0..archive.len())
        .find(|&i| {
            archive
                .by_index(i)
                .map(|entry| entry.name().ends_with(name_suffix))
                .unwrap_or(false)
        })
        .with_context(|| format!("no archive entry matching *{name_suffix}"))?;

    let mut entry = archive.by_index(index)?;
    let mut out = std::fs::File::create(dest)
        .with_context(|| format!("creating {}", dest.display()))?;
    std::io::copy(&mut entry, &mut out)?;

    info!(entry = entry.name(), path = %dest.display(), "Extracted archive entry");
    Ok(())
}
