//! The module responsible for writing output data to disk.
use crate::component::ComponentTable;
use crate::profile::{SequenceTable, format_timestamp};
use crate::report::{ScalarRow, TimeSeriesRow};
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub mod datapackage;
pub mod metadata;

/// The directory for element tables, relative to the datapackage root
pub const ELEMENTS_DIR: &str = "data/elements";

/// The directory for sequence tables, relative to the datapackage root
pub const SEQUENCES_DIR: &str = "data/sequences";

/// The name of the time index column in sequence tables
pub const TIMEINDEX_COLUMN: &str = "timeindex";

/// The output file name for the scalar report
const SCALARS_REPORT_FILE_NAME: &str = "Scalars.csv";

/// The output file name for the time series report
const TIMESERIES_REPORT_FILE_NAME: &str = "TimeSeries.csv";

/// Create a new output directory.
///
/// If the directory already exists and is not empty, it is only replaced if `overwrite` is
/// `true`.
///
/// # Returns
///
/// `true` if an existing non-empty directory was replaced, `false` otherwise, or an error.
pub fn create_output_directory(output_dir: &Path, overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        if output_dir.read_dir()?.next().is_none() {
            // Already exists and is empty
            return Ok(false);
        }

        ensure!(
            overwrite,
            "Output folder already exists and is not empty. Please specify a different folder or \
            use the --overwrite option."
        );
        fs::remove_dir_all(output_dir)?;
        fs::create_dir_all(output_dir)?;
        return Ok(true);
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// The path of an element table, relative to the datapackage root
pub fn element_path(name: &str) -> PathBuf {
    Path::new(ELEMENTS_DIR).join(format!("{name}.csv"))
}

/// The path of a sequence table, relative to the datapackage root
pub fn sequence_path(resource_name: &str) -> PathBuf {
    Path::new(SEQUENCES_DIR).join(format!("{resource_name}.csv"))
}

/// Create the parent directory of `file_path` if needed
fn ensure_parent_dir(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create directory {}", parent.display()))?;
    }

    Ok(())
}

/// Write an element table to `{datapackage_dir}/data/elements/{name}.csv`.
///
/// The columns are the union of the attributes of all rows. Attributes missing from a row are
/// written as empty cells.
pub fn write_component_table(datapackage_dir: &Path, table: &ComponentTable) -> Result<()> {
    let file_path = datapackage_dir.join(element_path(&table.name));
    ensure_parent_dir(&file_path)?;

    let columns = table.columns();
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    writer.write_record(&columns)?;
    for row in &table.rows {
        writer.write_record(columns.iter().map(|column| {
            row.get(column)
                .map(|value| value.to_string())
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write a sequence table to `{datapackage_dir}/data/sequences/{name}_profile.csv`.
///
/// The first column holds the time index.
pub fn write_sequence_table(datapackage_dir: &Path, table: &SequenceTable) -> Result<()> {
    let file_path = datapackage_dir.join(sequence_path(&table.resource_name()));
    ensure_parent_dir(&file_path)?;

    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    writer.write_record(
        std::iter::once(TIMEINDEX_COLUMN).chain(table.columns.keys().map(String::as_str)),
    )?;
    for (i, timestamp) in table.timeindex.iter().enumerate() {
        let values = table.columns.values().map(|values| values[i].to_string());
        writer.write_record(std::iter::once(format_timestamp(timestamp)).chain(values))?;
    }
    writer.flush()?;

    Ok(())
}

/// Serialise a series of rows to a CSV file
fn write_rows<'a, T, I>(file_path: &Path, rows: I) -> Result<()>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the filled scalar report to `Scalars.csv` in `output_dir`
pub fn write_scalar_report(output_dir: &Path, rows: &[ScalarRow]) -> Result<()> {
    write_rows(&output_dir.join(SCALARS_REPORT_FILE_NAME), rows)
}

/// Write the time series report to `TimeSeries.csv` in `output_dir`
pub fn write_timeseries_report(output_dir: &Path, rows: &[TimeSeriesRow]) -> Result<()> {
    write_rows(&output_dir.join(TIMESERIES_REPORT_FILE_NAME), rows)
}
