//! Building hourly profile tables from raw per-region time series.
use crate::input::timeseries::read_raw_time_series;
use crate::region::RegionID;
use anyhow::{Context, Result, bail, ensure};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The placeholder for the region name in profile file paths
pub const REGION_PLACEHOLDER: &str = "{region}";

/// The format used to write time stamps
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A profile to be built from raw time series, as given in the scenario file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileSpec {
    /// The name of the profile; also the stem of the output file
    pub name: String,
    /// Path to the raw files relative to the raw data directory, containing `{region}`
    pub path: String,
    /// The header of the column in the raw files containing the values
    pub column: String,
    /// The suffix of the output columns. Defaults to `{name}-profile`.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Whether each column should be scaled to sum to one
    #[serde(default)]
    pub normalize: bool,
}

impl ProfileSpec {
    /// The suffix appended to the region name to form column names
    pub fn suffix(&self) -> String {
        self.suffix
            .clone()
            .unwrap_or_else(|| format!("{}-profile", self.name))
    }

    /// The path of the raw file for a region, relative to the raw data directory
    pub fn path_for(&self, region_id: &RegionID) -> PathBuf {
        PathBuf::from(self.path.replace(REGION_PLACEHOLDER, region_id.as_str()))
    }
}

/// A wide table of hourly values, one column per region
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceTable {
    /// The name of the table
    pub name: String,
    /// The time stamp of each row
    pub timeindex: Vec<NaiveDateTime>,
    /// The values, keyed by column name
    pub columns: IndexMap<String, Vec<f64>>,
}

impl SequenceTable {
    /// Create an empty table with the given time index
    pub fn new(name: String, timeindex: Vec<NaiveDateTime>) -> Self {
        Self {
            name,
            timeindex,
            columns: IndexMap::new(),
        }
    }

    /// The name of the table as a datapackage resource (and file stem)
    pub fn resource_name(&self) -> String {
        format!("{}_profile", self.name)
    }

    /// The number of rows and columns (excluding the time index)
    pub fn shape(&self) -> (usize, usize) {
        (self.timeindex.len(), self.columns.len())
    }

    /// Add a column, checking that it has one value per time step
    pub fn add_column(&mut self, name: String, values: Vec<f64>) -> Result<()> {
        ensure!(
            values.len() == self.timeindex.len(),
            "Column {name} has {} values, but the time index has {}",
            values.len(),
            self.timeindex.len()
        );
        ensure!(
            !self.columns.contains_key(&name),
            "Duplicate column {name} in {}",
            self.name
        );
        self.columns.insert(name, values);

        Ok(())
    }

    /// Scale every column so that it sums to one
    pub fn normalize(&mut self) -> Result<()> {
        for (name, values) in &mut self.columns {
            let sum: f64 = values.iter().sum();
            ensure!(
                sum.is_finite() && sum != 0.0,
                "Cannot normalise column {name}: values sum to {sum}"
            );
            for value in values.iter_mut() {
                *value /= sum;
            }
        }

        Ok(())
    }
}

/// Generate an hourly time index without gaps
///
/// # Arguments
///
/// * `year` - The year the index starts in, at midnight on 1 January
/// * `timesteps` - The number of hours
pub fn hourly_timeindex(year: i32, timesteps: usize) -> Result<Vec<NaiveDateTime>> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .with_context(|| format!("Invalid year: {year}"))?;

    (0..timesteps)
        .map(|hour| {
            TimeDelta::try_hours(hour as i64)
                .and_then(|delta| start.checked_add_signed(delta))
                .context("Time index out of range")
        })
        .try_collect()
}

/// Format a time stamp as written to output files
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Combine the raw time series of every region into a single profile table.
///
/// The raw files for all regions are checked to exist before any are read. Every file must have
/// exactly one row per time step, and all files must share the same raw time index.
///
/// # Arguments
///
/// * `raw_dir` - Directory the paths in `spec` are relative to
/// * `spec` - The profile to build
/// * `region_ids` - The regions to include
/// * `timeindex` - The time index of the output table
pub fn build_profile(
    raw_dir: &Path,
    spec: &ProfileSpec,
    region_ids: &IndexSet<RegionID>,
    timeindex: &[NaiveDateTime],
) -> Result<SequenceTable> {
    let paths = region_ids
        .iter()
        .map(|region_id| (region_id, raw_dir.join(spec.path_for(region_id))))
        .collect_vec();

    let missing = paths
        .iter()
        .filter(|(_, path)| !path.is_file())
        .map(|(_, path)| path.display())
        .join(", ");
    ensure!(
        missing.is_empty(),
        "Missing time series files for profile {}: {missing}",
        spec.name
    );

    let suffix = spec.suffix();
    let mut table = SequenceTable::new(spec.name.clone(), timeindex.to_vec());
    let mut reference: Option<(&RegionID, Vec<String>)> = None;
    for (region_id, path) in &paths {
        let series = read_raw_time_series(path, &spec.column)?;
        ensure!(
            series.values.len() == timeindex.len(),
            "Time series {} has {} rows, but {} time steps are required",
            path.display(),
            series.values.len(),
            timeindex.len()
        );

        if let Some((reference_region, reference_index)) = &reference {
            if let Some(row) = series
                .index
                .iter()
                .zip(reference_index)
                .position(|(a, b)| a != b)
            {
                bail!(
                    "Time index of {} does not match that of region {reference_region} \
                    (first difference in row {})",
                    path.display(),
                    row + 1
                );
            }
        } else {
            reference = Some((*region_id, series.index));
        }

        table.add_column(format!("{region_id}-{suffix}"), series.values)?;
    }

    if spec.normalize {
        table
            .normalize()
            .with_context(|| format!("Failed to normalise profile {}", spec.name))?;
    }

    debug!(
        "Built profile {} with shape {:?}",
        table.name,
        table.shape()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, region_ids};
    use float_cmp::approx_eq;
    use rstest::rstest;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const TIMESTEPS: usize = 8760;

    fn profile_spec(normalize: bool) -> ProfileSpec {
        ProfileSpec {
            name: "wind-onshore".into(),
            path: "wind/{region}.csv".into(),
            column: "capacity_factor".into(),
            suffix: None,
            normalize,
        }
    }

    /// Write a raw time series file with the given values
    fn write_series(dir: &Path, region: &str, values: &[f64]) {
        let mut contents = String::from("timeindex,capacity_factor\n");
        for (hour, value) in values.iter().enumerate() {
            contents.push_str(&format!("{hour},{value}\n"));
        }
        fs::create_dir_all(dir.join("wind")).unwrap();
        fs::write(dir.join(format!("wind/{region}.csv")), contents).unwrap();
    }

    fn raw_dir_with(regions: &[&str], len: usize) -> TempDir {
        let dir = tempdir().unwrap();
        for (i, region) in regions.iter().enumerate() {
            let values = (0..len).map(|h| ((h + i) % 24) as f64 / 24.0).collect_vec();
            write_series(dir.path(), region, &values);
        }
        dir
    }

    #[test]
    fn hourly_timeindex_has_no_gaps() {
        let index = hourly_timeindex(2050, TIMESTEPS).unwrap();
        assert_eq!(index.len(), TIMESTEPS);
        assert_eq!(format_timestamp(&index[0]), "2050-01-01T00:00:00Z");
        assert_eq!(format_timestamp(&index[TIMESTEPS - 1]), "2050-12-31T23:00:00Z");
        assert!(
            index
                .windows(2)
                .all(|w| w[1] - w[0] == TimeDelta::hours(1))
        );
    }

    #[rstest]
    fn build_profile_shape_and_columns(region_ids: IndexSet<RegionID>) {
        let dir = raw_dir_with(&["AT", "DE"], TIMESTEPS);
        let timeindex = hourly_timeindex(2050, TIMESTEPS).unwrap();
        let table = build_profile(dir.path(), &profile_spec(false), &region_ids, &timeindex)
            .unwrap();

        assert_eq!(table.shape(), (TIMESTEPS, 2));
        assert!(
            table
                .columns
                .keys()
                .eq(["AT-wind-onshore-profile", "DE-wind-onshore-profile"])
        );
        assert_eq!(table.columns["DE-wind-onshore-profile"][0], 1.0 / 24.0);
        assert_eq!(table.resource_name(), "wind-onshore_profile");
    }

    #[rstest]
    fn build_profile_missing_files_listed(region_ids: IndexSet<RegionID>) {
        let dir = tempdir().unwrap();
        let timeindex = hourly_timeindex(2050, 24).unwrap();
        let at = dir.path().join("wind/AT.csv");
        let de = dir.path().join("wind/DE.csv");
        assert_error!(
            build_profile(dir.path(), &profile_spec(false), &region_ids, &timeindex),
            format!(
                "Missing time series files for profile wind-onshore: {}, {}",
                at.display(),
                de.display()
            )
        );
    }

    #[rstest]
    fn build_profile_wrong_length(region_ids: IndexSet<RegionID>) {
        let dir = raw_dir_with(&["AT", "DE"], 23);
        let timeindex = hourly_timeindex(2050, 24).unwrap();
        assert!(build_profile(dir.path(), &profile_spec(false), &region_ids, &timeindex).is_err());
    }

    #[rstest]
    fn build_profile_mismatched_index(region_ids: IndexSet<RegionID>) {
        let dir = raw_dir_with(&["AT"], 24);
        fs::write(
            dir.path().join("wind/DE.csv"),
            (0..24).fold(String::from("timeindex,capacity_factor\n"), |acc, h| {
                acc + &format!("{},0.5\n", h + 1)
            }),
        )
        .unwrap();
        let timeindex = hourly_timeindex(2050, 24).unwrap();
        let result = build_profile(dir.path(), &profile_spec(false), &region_ids, &timeindex);
        assert_error!(
            result,
            format!(
                "Time index of {} does not match that of region AT (first difference in row 1)",
                dir.path().join("wind/DE.csv").display()
            )
        );
    }

    #[rstest]
    fn build_profile_normalized(region_ids: IndexSet<RegionID>) {
        let dir = raw_dir_with(&["AT", "DE"], 48);
        let timeindex = hourly_timeindex(2050, 48).unwrap();
        let table =
            build_profile(dir.path(), &profile_spec(true), &region_ids, &timeindex).unwrap();
        for values in table.columns.values() {
            let sum: f64 = values.iter().sum();
            assert!(approx_eq!(f64, sum, 1.0, epsilon = 1e-12));
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let timeindex = hourly_timeindex(2050, 4).unwrap();
        let mut table = SequenceTable::new("demand".into(), timeindex);
        table
            .add_column("DE-demand".into(), vec![1.0, 2.0, 3.0, 7.0])
            .unwrap();
        table.normalize().unwrap();
        let once = table.columns["DE-demand"].clone();
        table.normalize().unwrap();
        for (a, b) in once.iter().zip(&table.columns["DE-demand"]) {
            assert!(approx_eq!(f64, *a, *b, epsilon = 1e-15));
        }
    }

    #[test]
    fn normalize_zero_column() {
        let timeindex = hourly_timeindex(2050, 2).unwrap();
        let mut table = SequenceTable::new("demand".into(), timeindex);
        table.add_column("DE-demand".into(), vec![0.0, 0.0]).unwrap();
        assert_error!(
            table.normalize(),
            "Cannot normalise column DE-demand: values sum to 0"
        );
    }

    #[test]
    fn add_column_checks_length_and_duplicates() {
        let timeindex = hourly_timeindex(2050, 2).unwrap();
        let mut table = SequenceTable::new("demand".into(), timeindex);
        assert!(table.add_column("DE-demand".into(), vec![1.0]).is_err());
        table.add_column("DE-demand".into(), vec![1.0, 1.0]).unwrap();
        assert!(table.add_column("DE-demand".into(), vec![1.0, 1.0]).is_err());
    }
}
