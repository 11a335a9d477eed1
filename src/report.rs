//! Mapping model results onto the FlexMex report templates.
//!
//! The external templates list the (region, parameter) pairs each model is expected to report. A
//! mapping table links every template parameter to a result variable, identified by carrier,
//! technology and variable name. Template entries without a matching result keep their previous
//! value and a warning is logged, as not every template field can be filled by every scenario.
use anyhow::{Result, ensure};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A scalar result of the model, as produced by the solver adapter
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResultScalar {
    /// The region (or link) the result belongs to
    pub region: String,
    /// The carrier of the component
    pub carrier: String,
    /// The technology of the component
    pub tech: String,
    /// The name of the variable (e.g. `capacity`, `flow_out`)
    pub var_name: String,
    /// The value of the variable
    pub var_value: f64,
    /// The unit of the value
    pub var_unit: String,
}

/// The key identifying a result: region, carrier, tech and variable name
type ResultKey = (String, String, String, String);

/// Result scalars indexed by [`ResultKey`]
#[derive(Debug, Default)]
pub struct ResultIndex(HashMap<ResultKey, f64>);

impl ResultIndex {
    /// Index result scalars, checking that each key occurs only once
    pub fn new<I>(results: I) -> Result<Self>
    where
        I: IntoIterator<Item = ResultScalar>,
    {
        let mut map = HashMap::new();
        for result in results {
            let key = (result.region, result.carrier, result.tech, result.var_name);
            ensure!(
                !map.contains_key(&key),
                "Duplicate result for region {}, carrier {}, tech {}, var_name {}",
                key.0,
                key.1,
                key.2,
                key.3
            );
            map.insert(key, result.var_value);
        }

        Ok(Self(map))
    }

    /// Get the value of a result, if present
    pub fn get(&self, region: &str, carrier: &str, tech: &str, var_name: &str) -> Option<f64> {
        let key = (
            region.to_string(),
            carrier.to_string(),
            tech.to_string(),
            var_name.to_string(),
        );
        self.0.get(&key).copied()
    }

    /// The number of results
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no results
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An entry of the mapping table, linking a template parameter to a result variable
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MappingEntry {
    /// The parameter name used in the report template
    #[serde(rename = "Parameter")]
    pub parameter: String,
    /// The carrier of the result variable
    pub carrier: String,
    /// The technology of the result variable
    pub tech: String,
    /// The name of the result variable
    pub var_name: String,
    /// Factor applied to the result value (e.g. to convert units). Defaults to 1.
    #[serde(default)]
    pub factor: Option<f64>,
}

impl MappingEntry {
    /// Convert a result value into the template's unit
    fn convert(&self, value: f64) -> f64 {
        match self.factor {
            Some(factor) => value * factor,
            None => value,
        }
    }
}

/// A mapping table keyed by template parameter
pub type Mapping = IndexMap<String, MappingEntry>;

/// Index mapping entries by parameter, checking that each parameter occurs only once
pub fn build_mapping<I>(entries: I) -> Result<Mapping>
where
    I: IntoIterator<Item = MappingEntry>,
{
    let mut mapping = Mapping::new();
    for entry in entries {
        ensure!(
            !mapping.contains_key(&entry.parameter),
            "Duplicate mapping entry for parameter {}",
            entry.parameter
        );
        mapping.insert(entry.parameter.clone(), entry);
    }

    Ok(mapping)
}

/// A row of the scalar report template (and of the filled report)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScalarRow {
    /// The use case (scenario) the row belongs to
    #[serde(rename = "UseCase")]
    pub use_case: String,
    /// The region
    #[serde(rename = "Region")]
    pub region: String,
    /// The name of the reported parameter
    #[serde(rename = "Parameter")]
    pub parameter: String,
    /// The reported value, if known
    #[serde(rename = "Value")]
    pub value: Option<f64>,
    /// The unit of the value
    #[serde(rename = "Unit")]
    pub unit: String,
}

/// A row of the time series report template
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeSeriesTemplateRow {
    /// The use case (scenario) the row belongs to
    #[serde(rename = "UseCase")]
    pub use_case: String,
    /// The region
    #[serde(rename = "Region")]
    pub region: String,
    /// The name of the reported parameter
    #[serde(rename = "Parameter")]
    pub parameter: String,
    /// The unit of the values
    #[serde(rename = "Unit")]
    pub unit: String,
}

/// A single value of the time series report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    #[serde(rename = "UseCase")]
    use_case: String,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Parameter")]
    parameter: String,
    #[serde(rename = "Unit")]
    unit: String,
    #[serde(rename = "Timeindex")]
    timeindex: String,
    #[serde(rename = "Value")]
    value: f64,
}

/// A wide table of result time series, with one column per component
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSequences {
    /// The time stamps
    pub timeindex: Vec<String>,
    /// The values, keyed by column name (`{region}-{carrier}-{tech}`)
    pub columns: IndexMap<String, Vec<f64>>,
}

/// The name of the column holding a component's result time series
pub fn sequence_column_name(region: &str, entry: &MappingEntry) -> String {
    format!("{region}-{}-{}", entry.carrier, entry.tech)
}

/// Log a single warning listing the template parameters which have no mapping entry
fn warn_unmapped(unmapped: &IndexSet<String>) {
    if !unmapped.is_empty() {
        warn!(
            "No mapping entry for {} parameter(s), values left unchanged: {}",
            unmapped.len(),
            unmapped.iter().join(", ")
        );
    }
}

/// Fill the scalar report template with model results.
///
/// Only template rows for `use_case` are returned. Rows whose parameter has no mapping entry or
/// whose result is missing keep their previous value.
///
/// # Arguments
///
/// * `template` - The rows of the scalar report template
/// * `use_case` - The use case to report on
/// * `mapping` - The mapping from template parameters to result variables
/// * `results` - The model's result scalars
pub fn map_result_scalars(
    template: Vec<ScalarRow>,
    use_case: &str,
    mapping: &Mapping,
    results: &ResultIndex,
) -> Result<Vec<ScalarRow>> {
    let mut rows = template
        .into_iter()
        .filter(|row| row.use_case == use_case)
        .collect_vec();
    ensure!(
        !rows.is_empty(),
        "Scalar template contains no rows for use case {use_case}"
    );

    let mut unmapped = IndexSet::new();
    let mut filled = 0;
    for row in &mut rows {
        let Some(entry) = mapping.get(&row.parameter) else {
            unmapped.insert(row.parameter.clone());
            continue;
        };

        match results.get(&row.region, &entry.carrier, &entry.tech, &entry.var_name) {
            Some(value) => {
                row.value = Some(entry.convert(value));
                filled += 1;
            }
            None => warn!(
                "No result for parameter {} in region {} (carrier: {}, tech: {}, var_name: {}), \
                value left unchanged",
                row.parameter, row.region, entry.carrier, entry.tech, entry.var_name
            ),
        }
    }
    warn_unmapped(&unmapped);
    info!("Filled {filled} of {} scalar report rows", rows.len());

    Ok(rows)
}

/// Build the time series report from the model's result sequences.
///
/// `load_sequences` is called once for each variable name and should return `None` if there are
/// no results for that variable. Rows which cannot be filled are skipped with a warning.
///
/// # Arguments
///
/// * `template` - The rows of the time series report template
/// * `use_case` - The use case to report on
/// * `mapping` - The mapping from template parameters to result variables
/// * `load_sequences` - Function loading the result sequences for a variable name
pub fn map_result_sequences<F>(
    template: Vec<TimeSeriesTemplateRow>,
    use_case: &str,
    mapping: &Mapping,
    mut load_sequences: F,
) -> Result<Vec<TimeSeriesRow>>
where
    F: FnMut(&str) -> Result<Option<ResultSequences>>,
{
    let mut cache: HashMap<String, Option<ResultSequences>> = HashMap::new();
    let mut unmapped = IndexSet::new();
    let mut out = Vec::new();
    for row in template.iter().filter(|row| row.use_case == use_case) {
        let Some(entry) = mapping.get(&row.parameter) else {
            unmapped.insert(row.parameter.clone());
            continue;
        };

        if !cache.contains_key(&entry.var_name) {
            let sequences = load_sequences(&entry.var_name)?;
            if sequences.is_none() {
                warn!("No result sequences found for variable {}", entry.var_name);
            }
            cache.insert(entry.var_name.clone(), sequences);
        }
        let Some(sequences) = &cache[&entry.var_name] else {
            continue;
        };

        let column = sequence_column_name(&row.region, entry);
        let Some(values) = sequences.columns.get(&column) else {
            warn!(
                "No result sequence {column} for parameter {} in region {}, skipping",
                row.parameter, row.region
            );
            continue;
        };

        debug!("Adding time series for {} in {}", row.parameter, row.region);
        out.extend(
            sequences
                .timeindex
                .iter()
                .zip(values)
                .map(|(timeindex, value)| TimeSeriesRow {
                    use_case: row.use_case.clone(),
                    region: row.region.clone(),
                    parameter: row.parameter.clone(),
                    unit: row.unit.clone(),
                    timeindex: timeindex.clone(),
                    value: entry.convert(*value),
                }),
        );
    }
    warn_unmapped(&unmapped);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::{fixture, rstest};

    fn result(region: &str, carrier: &str, tech: &str, var_name: &str, value: f64) -> ResultScalar {
        ResultScalar {
            region: region.into(),
            carrier: carrier.into(),
            tech: tech.into(),
            var_name: var_name.into(),
            var_value: value,
            var_unit: "MW".into(),
        }
    }

    fn entry(parameter: &str, carrier: &str, tech: &str, var_name: &str) -> MappingEntry {
        MappingEntry {
            parameter: parameter.into(),
            carrier: carrier.into(),
            tech: tech.into(),
            var_name: var_name.into(),
            factor: None,
        }
    }

    fn template_row(use_case: &str, region: &str, parameter: &str) -> ScalarRow {
        ScalarRow {
            use_case: use_case.into(),
            region: region.into(),
            parameter: parameter.into(),
            value: None,
            unit: "MW".into(),
        }
    }

    #[fixture]
    fn results() -> Vec<ResultScalar> {
        vec![
            result("DE", "electricity", "onshore", "capacity", 120.5),
            result("AT", "electricity", "onshore", "capacity", 33.25),
            result("DE", "ch4", "gt", "flow_out", 1.0e6),
            result("AT-DE", "electricity", "transmission", "capacity", 700.0),
        ]
    }

    #[rstest]
    fn map_result_scalars_fills_values(results: Vec<ResultScalar>) {
        let mapping = build_mapping([
            entry(
                "EnergyConversion_Capacity_Electricity_Wind_Onshore",
                "electricity",
                "onshore",
                "capacity",
            ),
            MappingEntry {
                factor: Some(1e-3),
                ..entry(
                    "EnergyConversion_SecondaryEnergy_Electricity_CH4_GT",
                    "ch4",
                    "gt",
                    "flow_out",
                )
            },
        ])
        .unwrap();
        let template = vec![
            template_row("base", "DE", "EnergyConversion_Capacity_Electricity_Wind_Onshore"),
            template_row("base", "DE", "EnergyConversion_SecondaryEnergy_Electricity_CH4_GT"),
            template_row("other", "DE", "EnergyConversion_Capacity_Electricity_Wind_Onshore"),
        ];

        let index = ResultIndex::new(results).unwrap();
        let rows = map_result_scalars(template, "base", &mapping, &index).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, Some(120.5));
        assert_eq!(rows[1].value, Some(1000.0));
    }

    #[rstest]
    fn map_result_scalars_keeps_prior_value_when_missing(results: Vec<ResultScalar>) {
        let mapping = build_mapping([entry("Storage_Capacity", "electricity", "liion", "capacity")])
            .unwrap();
        let template = vec![
            ScalarRow {
                value: Some(5.0),
                ..template_row("base", "DE", "Storage_Capacity")
            },
            template_row("base", "DE", "Unmapped_Parameter"),
        ];

        let index = ResultIndex::new(results).unwrap();
        let rows = map_result_scalars(template, "base", &mapping, &index).unwrap();
        assert_eq!(rows[0].value, Some(5.0));
        assert_eq!(rows[1].value, None);
    }

    #[rstest]
    fn identity_mapping_round_trip(results: Vec<ResultScalar>) {
        let parameter_name =
            |r: &ResultScalar| format!("{}|{}|{}", r.carrier, r.tech, r.var_name);
        let mapping = build_mapping(
            results
                .iter()
                .map(|r| entry(&parameter_name(r), &r.carrier, &r.tech, &r.var_name))
                .unique_by(|e| e.parameter.clone()),
        )
        .unwrap();
        let template = results
            .iter()
            .map(|r| template_row("base", &r.region, &parameter_name(r)))
            .collect_vec();

        let index = ResultIndex::new(results.clone()).unwrap();
        let rows = map_result_scalars(template, "base", &mapping, &index).unwrap();

        // Reverse the mapping and compare with the original results
        for row in rows {
            let entry = &mapping[&row.parameter];
            let original = results
                .iter()
                .find(|r| {
                    r.region == row.region
                        && r.carrier == entry.carrier
                        && r.tech == entry.tech
                        && r.var_name == entry.var_name
                })
                .unwrap();
            assert_eq!(row.value, Some(original.var_value));
        }
    }

    #[rstest]
    fn duplicate_results_rejected(results: Vec<ResultScalar>) {
        let mut results = results;
        results.push(result("DE", "electricity", "onshore", "capacity", 1.0));
        assert_error!(
            ResultIndex::new(results),
            "Duplicate result for region DE, carrier electricity, tech onshore, var_name capacity"
        );
    }

    #[test]
    fn duplicate_mapping_rejected() {
        assert_error!(
            build_mapping([
                entry("A", "electricity", "pv", "capacity"),
                entry("A", "electricity", "pv", "flow_out"),
            ]),
            "Duplicate mapping entry for parameter A"
        );
    }

    #[rstest]
    fn empty_use_case_rejected(results: Vec<ResultScalar>) {
        let index = ResultIndex::new(results).unwrap();
        assert_error!(
            map_result_scalars(
                vec![template_row("other", "DE", "A")],
                "base",
                &Mapping::new(),
                &index
            ),
            "Scalar template contains no rows for use case base"
        );
    }

    #[test]
    fn map_result_sequences_works() {
        let mapping = build_mapping([
            MappingEntry {
                factor: Some(2.0),
                ..entry("Generation_Wind", "electricity", "onshore", "flow_out")
            },
            entry("Storage_Level", "electricity", "liion", "storage_content"),
        ])
        .unwrap();
        let template = ["DE", "AT"]
            .into_iter()
            .flat_map(|region| {
                ["Generation_Wind", "Storage_Level", "Unmapped"].map(|parameter| {
                    TimeSeriesTemplateRow {
                        use_case: "base".into(),
                        region: region.into(),
                        parameter: parameter.into(),
                        unit: "MW".into(),
                    }
                })
            })
            .collect_vec();

        let mut loaded = Vec::new();
        let rows = map_result_sequences(template, "base", &mapping, |var_name| {
            loaded.push(var_name.to_string());
            if var_name != "flow_out" {
                return Ok(None);
            }
            Ok(Some(ResultSequences {
                timeindex: vec!["t0".into(), "t1".into()],
                columns: IndexMap::from([(
                    "DE-electricity-onshore".to_string(),
                    vec![1.0, 2.5],
                )]),
            }))
        })
        .unwrap();

        // Each variable is only loaded once
        assert_eq!(loaded, ["flow_out", "storage_content"]);

        // Only the German wind series is available
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "DE");
        assert_eq!(rows[0].timeindex, "t0");
        assert_eq!(rows[0].value, 2.0);
        assert_eq!(rows[1].value, 5.0);
    }
}
