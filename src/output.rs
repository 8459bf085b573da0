//! CSV persistence helpers used by every stage.
//!
//! Outputs are full-refresh: each stage writes its file once per run,
//! truncating whatever a previous run left behind.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Writes `records` to `path` as CSV with a header row, replacing any
/// existing file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = records.len(), "Writing CSV");

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating output file {}", path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Reads every row of `path` into `T`. A missing file or a missing column is
/// a structural error and aborts with the file named.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening input file {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: T =
            result.with_context(|| format!("reading record from {}", path.display()))?;
        rows.push(record);
    }

    debug!(path = %path.display(), rows = rows.len(), "Read CSV");
    Ok(rows)
}

/// Verifies that the header of `path` contains every column in `required`.
///
/// Run before deserialization so a schema drift in an upstream file fails
/// with the missing column named rather than a serde error.
pub fn check_columns(path: &Path, required: &[&str]) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening input file {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?;

    let missing: Vec<&str> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect();

    if !missing.is_empty() {
        bail!("{}: missing required columns {:?}", path.display(), missing);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        value: Option<f64>,
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.csv");

        let rows = vec![
            Row { name: "a".into(), value: Some(1.5) },
            Row { name: "b".into(), value: None },
        ];
        write_records(&path, &rows).unwrap();

        let back: Vec<Row> = read_records(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_write_truncates_previous_run() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.csv");

        let first = vec![Row { name: "a".into(), value: None }; 5];
        write_records(&path, &first).unwrap();

        let second = vec![Row { name: "b".into(), value: None }];
        write_records(&path, &second).unwrap();

        let back: Vec<Row> = read_records(&path).unwrap();
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let result: Result<Vec<Row>> = read_records(Path::new("/nonexistent/rows.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_check_columns_reports_missing_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.csv");
        std::fs::write(&path, "name,value\na,1\n").unwrap();

        assert!(check_columns(&path, &["name", "value"]).is_ok());

        let err = check_columns(&path, &["name", "year"]).unwrap_err();
        assert!(err.to_string().contains("year"));
    }
}
