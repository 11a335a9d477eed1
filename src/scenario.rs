//! Read and validate the scenario file.
//!
//! A scenario file is a TOML document naming the regions, links, components and profiles which
//! make up a FlexMex scenario, along with the files used for reporting on its results.
use crate::component::{Technology, get_technology};
use crate::input::{find_duplicate, input_err_msg, read_toml};
use crate::profile::{ProfileSpec, REGION_PLACEHOLDER};
use crate::region::{ALL_REGIONS, Link, RegionID};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexSet;
use itertools::Itertools;
use serde::Deserialize;
use std::path::{Path, PathBuf};

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_timesteps, usize, 8760);
define_param_default!(default_scalars_file, PathBuf, "Scalars.csv".into());
define_param_default!(default_template_file, PathBuf, "Scalars_template.csv".into());
define_param_default!(default_mapping_file, PathBuf, "mapping.csv".into());

/// The contents of a scenario file, before validation
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    name: String,
    #[serde(default)]
    use_case: Option<String>,
    year: i32,
    regions: Vec<RegionID>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default = "default_timesteps")]
    timesteps: usize,
    #[serde(default = "default_scalars_file")]
    scalars_file: PathBuf,
    components: Vec<ComponentEntry>,
    #[serde(default)]
    profiles: Vec<ProfileSpec>,
    #[serde(default)]
    report: ReportFile,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ComponentEntry {
    name: String,
    #[serde(default)]
    expandable: bool,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ReportFile {
    #[serde(default = "default_template_file")]
    template_file: PathBuf,
    #[serde(default = "default_mapping_file")]
    mapping_file: PathBuf,
    #[serde(default)]
    timeseries_template_file: Option<PathBuf>,
}

impl Default for ReportFile {
    fn default() -> Self {
        Self {
            template_file: default_template_file(),
            mapping_file: default_mapping_file(),
            timeseries_template_file: None,
        }
    }
}

/// A technology selected for a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSelection {
    /// The technology
    pub technology: &'static Technology,
    /// Whether the capacity of the component may be expanded
    pub expandable: bool,
}

/// The files used to report on a scenario's results
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSpec {
    /// The scalar report template
    pub template_file: PathBuf,
    /// The mapping from template parameters to result variables
    pub mapping_file: PathBuf,
    /// The time series report template, if a time series report is wanted
    pub timeseries_template_file: Option<PathBuf>,
}

/// A validated scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// The name of the scenario, used to select rows of the parameter table
    pub name: String,
    /// The use case reported on in the result templates
    pub use_case: String,
    /// The modelled year
    pub year: i32,
    /// The regions, in the order given
    pub region_ids: IndexSet<RegionID>,
    /// Transmission links between regions
    pub links: Vec<Link>,
    /// The number of hourly time steps
    pub timesteps: usize,
    /// The parameter table, relative to the raw data directory
    pub scalars_file: PathBuf,
    /// The components included in the scenario
    pub components: Vec<ComponentSelection>,
    /// The profiles built from raw time series
    pub profiles: Vec<ProfileSpec>,
    /// Report files, resolved relative to the scenario file
    pub report: ReportSpec,
}

impl Scenario {
    /// Read and validate a scenario file.
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path to the scenario TOML file
    pub fn from_path(file_path: &Path) -> Result<Self> {
        let file: ScenarioFile = read_toml(file_path)?;
        let base_dir = file_path.parent().unwrap_or(Path::new(""));
        Self::from_file(file, base_dir).with_context(|| input_err_msg(file_path))
    }

    fn from_file(file: ScenarioFile, base_dir: &Path) -> Result<Self> {
        let region_ids = check_regions(file.regions)?;
        let links = check_links(&file.links, &region_ids)?;
        ensure!(file.timesteps > 0, "timesteps cannot be zero");
        let components = check_components(&file.components, !links.is_empty())?;
        check_profiles(&file.profiles, &components)?;

        let report = ReportSpec {
            template_file: base_dir.join(file.report.template_file),
            mapping_file: base_dir.join(file.report.mapping_file),
            timeseries_template_file: file
                .report
                .timeseries_template_file
                .map(|path| base_dir.join(path)),
        };

        Ok(Self {
            use_case: file.use_case.unwrap_or_else(|| file.name.clone()),
            name: file.name,
            year: file.year,
            region_ids,
            links,
            timesteps: file.timesteps,
            scalars_file: file.scalars_file,
            components,
            profiles: file.profiles,
            report,
        })
    }
}

fn check_regions(regions: Vec<RegionID>) -> Result<IndexSet<RegionID>> {
    ensure!(!regions.is_empty(), "No regions defined");
    if let Some(region_id) = find_duplicate(&regions) {
        bail!("Duplicate region {region_id}");
    }
    ensure!(
        !regions.iter().any(|region_id| region_id.as_str() == ALL_REGIONS),
        "{ALL_REGIONS} is reserved for global parameters and cannot be used as a region name"
    );

    Ok(regions.into_iter().collect())
}

fn check_links(links: &[String], region_ids: &IndexSet<RegionID>) -> Result<Vec<Link>> {
    let links: Vec<Link> = links
        .iter()
        .map(|link| Link::parse(link, region_ids))
        .try_collect()?;

    // Compare normalised IDs, as whitespace around region names is ignored when parsing
    if let Some(link_id) = find_duplicate(links.iter().map(|link| &link.id)) {
        bail!("Duplicate link {link_id}");
    }

    Ok(links)
}

fn check_components(
    entries: &[ComponentEntry],
    have_links: bool,
) -> Result<Vec<ComponentSelection>> {
    ensure!(!entries.is_empty(), "No components defined");
    if let Some(name) = find_duplicate(entries.iter().map(|entry| &entry.name)) {
        bail!("Component {name} is included more than once");
    }

    entries
        .iter()
        .map(|entry| {
            let technology = get_technology(&entry.name)
                .with_context(|| format!("Unknown component {}", entry.name))?;
            ensure!(
                !entry.expandable || technology.can_expand(),
                "Component {} cannot be expandable",
                entry.name
            );
            ensure!(
                have_links || !technology.is_link(),
                "Component {} requires links between regions, but none are defined",
                entry.name
            );

            Ok(ComponentSelection {
                technology,
                expandable: entry.expandable,
            })
        })
        .try_collect()
}

fn check_profiles(profiles: &[ProfileSpec], components: &[ComponentSelection]) -> Result<()> {
    if let Some(name) = find_duplicate(profiles.iter().map(|profile| &profile.name)) {
        bail!("Duplicate profile {name}");
    }

    let suffixes = profiles.iter().map(ProfileSpec::suffix).collect_vec();
    if let Some(suffix) = find_duplicate(&suffixes) {
        bail!("More than one profile has the suffix {suffix}");
    }

    for profile in profiles {
        ensure!(
            profile.path.contains(REGION_PLACEHOLDER),
            "Path of profile {} must contain {REGION_PLACEHOLDER}",
            profile.name
        );
    }

    for component in components {
        if let Some(suffix) = &component.technology.profile {
            ensure!(
                suffixes.contains(suffix),
                "Component {} uses profile {suffix}, but no profile provides it",
                component.technology.name
            );
        }
    }

    Ok(())
}
