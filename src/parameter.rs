//! The parameter table: named scalar inputs which are either global or region-specific.
//!
//! Every physical and economic input for a scenario (capacities, efficiencies, costs, lifetimes,
//! etc.) is stored as a row in a flat table. A parameter either has a single value which applies
//! to all regions (given with the region name [`ALL_REGIONS`]) or one value per region.
use crate::region::{ALL_REGIONS, RegionID};
use anyhow::{Result, bail, ensure};
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Deserialize;
use thiserror::Error;

/// A single row of the parameter table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParameterRow {
    /// The scenario the value applies to
    #[serde(rename = "Scenario")]
    pub scenario: String,
    /// The region the value applies to, or [`ALL_REGIONS`]
    #[serde(rename = "Region")]
    pub region: String,
    /// The name of the parameter
    #[serde(rename = "Parameter")]
    pub parameter: String,
    /// The value of the parameter
    #[serde(rename = "Value")]
    pub value: f64,
    /// The unit of the value (informational only)
    #[serde(rename = "Unit", default)]
    pub unit: String,
}

/// The value(s) of a single parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// One value shared by every region
    Global(f64),
    /// A separate value for each region
    PerRegion(IndexMap<RegionID, f64>),
}

impl ParameterValue {
    /// Get the value which applies to `region`, if there is one
    pub fn get(&self, region: &RegionID) -> Option<f64> {
        match self {
            Self::Global(value) => Some(*value),
            Self::PerRegion(values) => values.get(region).copied(),
        }
    }
}

/// Errors arising from looking up parameters
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParameterError {
    /// No rows were given for the parameter
    #[error("Parameter not found: {0}")]
    NotFound(String),
    /// The parameter is region-specific but has no value for the requested region
    #[error("Parameter {parameter} has no value for region {region}")]
    MissingRegion {
        /// The parameter name
        parameter: String,
        /// The region without a value
        region: String,
    },
    /// Parameters required to build a component are absent
    #[error("Missing parameters for component {component}: {}", parameters.join(", "))]
    MissingParameter {
        /// The name of the component being built
        component: String,
        /// All the parameters which could not be resolved
        parameters: Vec<String>,
    },
}

/// The parameter table for a single scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    scenario: String,
    parameters: IndexMap<String, ParameterValue>,
}

impl ParameterTable {
    /// Build a parameter table from rows, keeping only those for `scenario`.
    ///
    /// # Returns
    ///
    /// The parameter table, or an error if no rows belong to the scenario or if any parameter
    /// mixes global and region-specific values or repeats a region.
    pub fn from_rows<I>(scenario: &str, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = ParameterRow>,
    {
        let mut parameters: IndexMap<String, ParameterValue> = IndexMap::new();
        for row in rows.into_iter().filter(|row| row.scenario == scenario) {
            ensure!(
                row.value.is_finite(),
                "Parameter {} has a non-finite value for region {}",
                row.parameter,
                row.region
            );

            let is_global = row.region == ALL_REGIONS;
            match parameters.entry(row.parameter) {
                Entry::Vacant(entry) => {
                    let value = if is_global {
                        ParameterValue::Global(row.value)
                    } else {
                        ParameterValue::PerRegion(IndexMap::from([(
                            RegionID::from(row.region),
                            row.value,
                        )]))
                    };
                    entry.insert(value);
                }
                Entry::Occupied(mut entry) => {
                    let name = entry.key().clone();
                    match entry.get_mut() {
                        ParameterValue::PerRegion(values) if !is_global => {
                            let region = RegionID::from(row.region);
                            ensure!(
                                values.insert(region.clone(), row.value).is_none(),
                                "Parameter {name} has more than one value for region {region}"
                            );
                        }
                        _ => bail!(
                            "Parameter {name} is ambiguous: a value for {ALL_REGIONS} regions may \
                            not be combined with other values"
                        ),
                    }
                }
            }
        }

        ensure!(
            !parameters.is_empty(),
            "No parameters found for scenario {scenario}"
        );

        Ok(Self {
            scenario: scenario.to_string(),
            parameters,
        })
    }

    /// The scenario this table belongs to
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// The number of distinct parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the table contains no parameters
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Look up the value(s) of a parameter by name
    pub fn lookup(&self, parameter: &str) -> Result<&ParameterValue, ParameterError> {
        self.parameters
            .get(parameter)
            .ok_or_else(|| ParameterError::NotFound(parameter.to_string()))
    }

    /// Resolve the value of a parameter for a specific region.
    ///
    /// Global values apply to every region.
    pub fn value_for(&self, parameter: &str, region: &RegionID) -> Result<f64, ParameterError> {
        self.lookup(parameter)?
            .get(region)
            .ok_or_else(|| ParameterError::MissingRegion {
                parameter: parameter.to_string(),
                region: region.to_string(),
            })
    }
}
