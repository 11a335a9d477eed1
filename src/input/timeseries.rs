//! Code for reading raw per-region time series from CSV files.
use super::input_err_msg;
use anyhow::{Context, Result, ensure};
use std::path::Path;

/// A single time series as read from a raw input file
#[derive(Debug, Clone, PartialEq)]
pub struct RawTimeSeries {
    /// The raw time index (the first column of the file), kept as text
    pub index: Vec<String>,
    /// The values of the selected column
    pub values: Vec<f64>,
}

/// Read one column of a raw time series file.
///
/// The first column of the file is taken to be the time index.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
/// * `column` - The header of the column containing the values
pub fn read_raw_time_series(file_path: &Path, column: &str) -> Result<RawTimeSeries> {
    read_raw_time_series_inner(file_path, column).with_context(|| input_err_msg(file_path))
}

fn read_raw_time_series_inner(file_path: &Path, column: &str) -> Result<RawTimeSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;
    let column_idx = reader
        .headers()?
        .iter()
        .position(|header| header == column)
        .with_context(|| format!("Column '{column}' not found"))?;
    ensure!(
        column_idx > 0,
        "Column '{column}' is the time index and cannot hold values"
    );

    let mut series = RawTimeSeries {
        index: Vec::new(),
        values: Vec::new(),
    };
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let value = record.get(column_idx).unwrap_or_default();
        let value = value
            .parse::<f64>()
            .with_context(|| format!("Invalid value '{value}' in row {}", row + 1))?;
        ensure!(value.is_finite(), "Non-finite value in row {}", row + 1);
        series.index.push(record.get(0).unwrap_or_default().to_string());
        series.values.push(value);
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn read_raw_time_series_works() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("DE.csv");
        fs::write(
            &file_path,
            "timeindex_start,timeindex_stop,load\n\
            2050-01-01 00:00,2050-01-01 01:00,1.5\n\
            2050-01-01 01:00,2050-01-01 02:00, 2.5\n",
        )
        .unwrap();

        let series = read_raw_time_series(&file_path, "load").unwrap();
        assert_eq!(series.index, ["2050-01-01 00:00", "2050-01-01 01:00"]);
        assert_eq!(series.values, [1.5, 2.5]);
    }

    #[test]
    fn read_raw_time_series_errors() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("DE.csv");
        fs::write(&file_path, "t,load\n0,abc\n").unwrap();

        let err = read_raw_time_series(&file_path, "load").unwrap_err();
        assert_eq!(
            err.chain().nth(1).unwrap().to_string(),
            "Invalid value 'abc' in row 1"
        );
        assert!(read_raw_time_series(&file_path, "capacity_factor").is_err());
        assert!(read_raw_time_series(&file_path, "t").is_err());
        assert_error!(
            read_raw_time_series(&dir.path().join("missing.csv"), "load"),
            format!("Error reading {}", dir.path().join("missing.csv").display())
        );
    }
}
