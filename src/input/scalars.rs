//! Code for reading the scenario parameter table ("Scalars") from a CSV file.
use super::{input_err_msg, read_csv};
use crate::parameter::{ParameterRow, ParameterTable};
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// Read the parameter table for a scenario.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file, with columns `Scenario`, `Region`, `Parameter`, `Value`
///   and `Unit`
/// * `scenario` - The name of the scenario; rows for other scenarios are ignored
///
/// # Returns
///
/// The [`ParameterTable`] or an error.
pub fn read_parameter_table(file_path: &Path, scenario: &str) -> Result<ParameterTable> {
    let rows = read_csv::<ParameterRow>(file_path)?;
    let table =
        ParameterTable::from_rows(scenario, rows).with_context(|| input_err_msg(file_path))?;
    debug!(
        "Read {} parameters for scenario {} from {}",
        table.len(),
        table.scenario(),
        file_path.display()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterValue;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn read_parameter_table_works() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Scalars.csv");
        fs::write(
            &file_path,
            "Scenario,Region,Year,Parameter,Value,Unit,Comment\n\
            base,ALL,2050,Energy_FinalEnergy_Electricity,500,GWh,\n\
            base,DE,2050,EnergyConversion_Capacity_Electricity_Wind_Onshore,80,MW,\n\
            other,ALL,2050,Energy_FinalEnergy_Electricity,100,GWh,\n",
        )
        .unwrap();

        let table = read_parameter_table(&file_path, "base").unwrap();
        assert_eq!(table.scenario(), "base");
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup("Energy_FinalEnergy_Electricity").unwrap(),
            &ParameterValue::Global(500.0)
        );
    }

    #[test]
    fn read_parameter_table_ambiguous() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Scalars.csv");
        fs::write(
            &file_path,
            "Scenario,Region,Parameter,Value,Unit\n\
            base,ALL,A,1,-\n\
            base,DE,A,2,-\n",
        )
        .unwrap();

        let err = read_parameter_table(&file_path, "base").unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Error reading {}", file_path.display())
        );
    }
}
