//! The preprocessing and postprocessing pipelines.
use crate::component::{BUS_TABLE_NAME, ComponentTable, build_bus_table, update_component};
use crate::input::results::{
    read_mapping, read_result_scalars, read_result_sequences, read_scalar_template,
    read_timeseries_template,
};
use crate::input::scalars::read_parameter_table;
use crate::output::datapackage::write_datapackage;
use crate::output::metadata::write_metadata;
use crate::output::{
    write_component_table, write_scalar_report, write_sequence_table, write_timeseries_report,
};
use crate::profile::{SequenceTable, build_profile, hourly_timeindex};
use crate::report::{map_result_scalars, map_result_sequences};
use crate::scenario::Scenario;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use std::path::Path;

/// The element and sequence tables making up an oemof.tabular datapackage
#[derive(Debug, Clone, PartialEq)]
pub struct Datapackage {
    /// The element tables, with the bus table first
    pub components: Vec<ComponentTable>,
    /// The sequence tables
    pub sequences: Vec<SequenceTable>,
}

impl Datapackage {
    /// Get an element table by name
    pub fn component(&self, name: &str) -> Option<&ComponentTable> {
        self.components.iter().find(|table| table.name == name)
    }

    /// Get a sequence table by profile name
    pub fn sequence(&self, name: &str) -> Option<&SequenceTable> {
        self.sequences.iter().find(|table| table.name == name)
    }
}

/// Build the datapackage for a scenario without writing anything to disk.
///
/// # Arguments
///
/// * `scenario` - The scenario to prepare
/// * `raw_dir` - Directory containing the parameter table and raw time series
pub fn prepare_datapackage(scenario: &Scenario, raw_dir: &Path) -> Result<Datapackage> {
    let parameters = read_parameter_table(&raw_dir.join(&scenario.scalars_file), &scenario.name)?;

    let mut components = Vec::with_capacity(scenario.components.len() + 1);
    for selection in &scenario.components {
        let technology = selection.technology;
        let mut table =
            ComponentTable::from_template(technology, &scenario.region_ids, &scenario.links)?;
        update_component(&mut table, technology, selection.expandable, &parameters)
            .with_context(|| format!("Failed to build component {}", technology.name))?;
        components.push(table);
    }
    components.insert(0, build_bus_table(&components));

    let timeindex = hourly_timeindex(scenario.year, scenario.timesteps)?;
    let sequences: Vec<_> = scenario
        .profiles
        .iter()
        .map(|spec| build_profile(raw_dir, spec, &scenario.region_ids, &timeindex))
        .try_collect()?;

    info!(
        "Prepared {} element table(s) and {} sequence table(s) for scenario {}",
        components.len(),
        sequences.len(),
        scenario.name
    );

    Ok(Datapackage {
        components,
        sequences,
    })
}

/// Write a datapackage to `output_dir`
pub fn write_package(output_dir: &Path, name: &str, package: &Datapackage) -> Result<()> {
    for table in &package.components {
        write_component_table(output_dir, table)
            .with_context(|| format!("Failed to write element table {}", table.name))?;
    }
    for table in &package.sequences {
        write_sequence_table(output_dir, table)
            .with_context(|| format!("Failed to write sequence table {}", table.name))?;
    }
    write_datapackage(output_dir, name, &package.components, &package.sequences)
}

/// Prepare a scenario's datapackage and write it to `output_dir`.
///
/// # Arguments
///
/// * `scenario_path` - Path to the scenario file (recorded in the metadata)
/// * `scenario` - The loaded scenario
/// * `raw_dir` - Directory containing the parameter table and raw time series
/// * `output_dir` - Directory for the datapackage, which must already exist
pub fn run_preprocessing(
    scenario_path: &Path,
    scenario: &Scenario,
    raw_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    write_metadata(output_dir, "preprocess", raw_dir, scenario_path, scenario)
        .context("Failed to save metadata")?;
    let package = prepare_datapackage(scenario, raw_dir)?;
    write_package(output_dir, &scenario.name, &package)?;
    info!("Datapackage written to {}", output_dir.display());

    Ok(())
}

/// Map a scenario's model results onto the report templates and write the reports.
///
/// # Arguments
///
/// * `scenario_path` - Path to the scenario file (recorded in the metadata)
/// * `scenario` - The loaded scenario
/// * `results_dir` - Directory containing the model results
/// * `output_dir` - Directory for the reports, which must already exist
pub fn run_postprocessing(
    scenario_path: &Path,
    scenario: &Scenario,
    results_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    write_metadata(output_dir, "postprocess", results_dir, scenario_path, scenario)
        .context("Failed to save metadata")?;

    let report = &scenario.report;
    let mapping = read_mapping(&report.mapping_file)?;
    let results = read_result_scalars(results_dir)?;
    let template = read_scalar_template(&report.template_file)?;
    let rows = map_result_scalars(template, &scenario.use_case, &mapping, &results)?;
    write_scalar_report(output_dir, &rows).context("Failed to write scalar report")?;

    if let Some(template_file) = &report.timeseries_template_file {
        let template = read_timeseries_template(template_file)?;
        let rows = map_result_sequences(template, &scenario.use_case, &mapping, |var_name| {
            read_result_sequences(results_dir, var_name)
        })?;
        info!("Writing {} time series report values", rows.len());
        write_timeseries_report(output_dir, &rows).context("Failed to write time series report")?;
    }

    info!("Reports written to {}", output_dir.display());

    Ok(())
}

/// The names of the element tables a scenario would produce, including the bus table
pub fn element_table_names(scenario: &Scenario) -> Vec<&str> {
    std::iter::once(BUS_TABLE_NAME)
        .chain(scenario.components.iter().map(|c| c.technology.name))
        .collect_vec()
}
