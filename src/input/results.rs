//! Code for reading model results, report templates and the result mapping.
use super::{input_err_msg, read_csv, read_csv_optional};
use crate::report::{
    Mapping, MappingEntry, ResultIndex, ResultScalar, ResultSequences, ScalarRow,
    TimeSeriesTemplateRow, build_mapping,
};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::debug;
use std::path::Path;

/// The file name of the result scalars in the results directory
pub const RESULT_SCALARS_FILE_NAME: &str = "scalars.csv";

/// The name of the subdirectory of the results directory holding result sequences
pub const RESULT_SEQUENCES_DIR_NAME: &str = "sequences";

/// Read the result scalars from the results directory.
///
/// The file must have the columns `region`, `carrier`, `tech`, `var_name`, `var_value` and
/// `var_unit`. Each combination of region, carrier, tech and var_name may only appear once.
pub fn read_result_scalars(results_dir: &Path) -> Result<ResultIndex> {
    let file_path = results_dir.join(RESULT_SCALARS_FILE_NAME);
    let results = read_csv::<ResultScalar>(&file_path)?;
    let index = ResultIndex::new(results).with_context(|| input_err_msg(&file_path))?;
    debug!("Read {} result scalars", index.len());

    Ok(index)
}

/// Read the mapping from report template parameters to result variables
pub fn read_mapping(file_path: &Path) -> Result<Mapping> {
    let entries = read_csv::<MappingEntry>(file_path)?;
    build_mapping(entries).with_context(|| input_err_msg(file_path))
}

/// Read the scalar report template
pub fn read_scalar_template(file_path: &Path) -> Result<Vec<ScalarRow>> {
    Ok(read_csv(file_path)?.collect())
}

/// Read the time series report template
pub fn read_timeseries_template(file_path: &Path) -> Result<Vec<TimeSeriesTemplateRow>> {
    Ok(read_csv_optional(file_path)?.collect())
}

/// Read the result sequences for one variable, if there are any.
///
/// Sequences are stored in `{results_dir}/sequences/{var_name}.csv`, with the time index in the
/// first column and one column per component.
///
/// # Returns
///
/// The sequences, `None` if the file does not exist or an error if it could not be read.
pub fn read_result_sequences(
    results_dir: &Path,
    var_name: &str,
) -> Result<Option<ResultSequences>> {
    let file_path = results_dir
        .join(RESULT_SEQUENCES_DIR_NAME)
        .join(format!("{var_name}.csv"));
    if !file_path.is_file() {
        return Ok(None);
    }

    read_wide_table(&file_path)
        .with_context(|| input_err_msg(&file_path))
        .map(Some)
}

fn read_wide_table(file_path: &Path) -> Result<ResultSequences> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;
    let headers = reader.headers()?.clone();
    ensure!(!headers.is_empty(), "Missing header row");

    let mut columns: IndexMap<String, Vec<f64>> = IndexMap::new();
    for header in headers.iter().skip(1) {
        ensure!(
            columns.insert(header.to_string(), Vec::new()).is_none(),
            "Duplicate column '{header}'"
        );
    }

    let mut timeindex = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        timeindex.push(record.get(0).unwrap_or_default().to_string());
        for (value, values) in record.iter().skip(1).zip(columns.values_mut()) {
            let value = value
                .parse::<f64>()
                .with_context(|| format!("Invalid value '{value}' in row {}", row + 1))?;
            values.push(value);
        }
    }

    Ok(ResultSequences { timeindex, columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn read_result_scalars_works() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(RESULT_SCALARS_FILE_NAME),
            "region,carrier,tech,var_name,var_value,var_unit,type\n\
            DE,electricity,onshore,capacity,120,MW,volatile\n\
            AT-DE,electricity,transmission,capacity,500,MW,link\n",
        )
        .unwrap();

        let index = read_result_scalars(dir.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get("AT-DE", "electricity", "transmission", "capacity"),
            Some(500.0)
        );
    }

    #[test]
    fn read_mapping_works() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("mapping.csv");
        fs::write(
            &file_path,
            "Parameter,carrier,tech,var_name,factor\n\
            EnergyConversion_Capacity_Electricity_Wind_Onshore,electricity,onshore,capacity,\n\
            EnergyConversion_SecondaryEnergy_Electricity_CH4_GT,ch4,gt,flow_out,0.001\n",
        )
        .unwrap();

        let mapping = read_mapping(&file_path).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping[0].factor, None);
        assert_eq!(mapping[1].factor, Some(0.001));
    }

    #[test]
    fn read_scalar_template_keeps_empty_values() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Scalars_template.csv");
        fs::write(
            &file_path,
            "UseCase,Region,Parameter,Value,Unit\n\
            base,DE,Energy_Costs_Total,,Eur\n\
            base,AT,Energy_Costs_Total,3.5,Eur\n",
        )
        .unwrap();

        let rows = read_scalar_template(&file_path).unwrap();
        assert_eq!(rows[0].value, None);
        assert_eq!(rows[1].value, Some(3.5));
    }

    #[test]
    fn read_result_sequences_works() {
        let dir = tempdir().unwrap();
        let sequences_dir = dir.path().join(RESULT_SEQUENCES_DIR_NAME);
        fs::create_dir(&sequences_dir).unwrap();
        fs::write(
            sequences_dir.join("flow_out.csv"),
            "timeindex,DE-electricity-onshore,AT-electricity-onshore\n\
            2050-01-01T00:00:00Z,1,2\n\
            2050-01-01T01:00:00Z,3,4\n",
        )
        .unwrap();

        let sequences = read_result_sequences(dir.path(), "flow_out")
            .unwrap()
            .unwrap();
        assert_eq!(sequences.timeindex.len(), 2);
        assert_eq!(sequences.columns["AT-electricity-onshore"], [2.0, 4.0]);

        // Missing files are not an error
        assert!(
            read_result_sequences(dir.path(), "storage_content")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn read_result_sequences_bad_value() {
        let dir = tempdir().unwrap();
        let sequences_dir = dir.path().join(RESULT_SEQUENCES_DIR_NAME);
        fs::create_dir(&sequences_dir).unwrap();
        let file_path = sequences_dir.join("flow_out.csv");
        fs::write(&file_path, "timeindex,DE-electricity-onshore\nt0,x\n").unwrap();

        assert_error!(
            read_result_sequences(dir.path(), "flow_out"),
            format!("Error reading {}", file_path.display())
        );
    }
}
