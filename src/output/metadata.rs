//! Write run, build and platform metadata to a TOML file.
//!
//! Records which command produced an output directory, from which scenario, with which build of
//! the program and on which platform.
use crate::region::RegionID;
use crate::scenario::Scenario;
use anyhow::{Result, anyhow};
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output filename used for metadata.
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Constants describing the build, generated by `build.rs`
#[allow(clippy::doc_markdown)]
#[allow(clippy::needless_raw_strings)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// The short git hash of the build, suffixed with `-dirty` for modified trees
fn git_commit_hash() -> String {
    match (built_info::GIT_COMMIT_HASH_SHORT, built_info::GIT_DIRTY) {
        (Some(hash), Some(true)) => format!("{hash}-dirty"),
        (Some(hash), _) => hash.to_string(),
        (None, _) => "unknown".to_string(),
    }
}

/// The contents of `metadata.toml`
#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    scenario: ScenarioMetadata<'a>,
    program: ProgramMetadata<'a>,
    platform: PlatformMetadata,
}

/// Information about the run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// The command which was run (e.g. `preprocess`)
    command: &'a str,
    /// The directory the command read its data from
    input_dir: &'a Path,
    /// The local date and time at which the run started
    datetime: String,
}

/// A summary of the scenario which was processed
#[derive(Serialize)]
struct ScenarioMetadata<'a> {
    /// Path to the scenario file
    path: &'a Path,
    name: &'a str,
    use_case: &'a str,
    year: i32,
    regions: Vec<&'a str>,
    links: Vec<&'a str>,
    /// The names of the included components
    components: Vec<&'static str>,
}

impl<'a> ScenarioMetadata<'a> {
    fn new(path: &'a Path, scenario: &'a Scenario) -> Self {
        Self {
            path,
            name: &scenario.name,
            use_case: &scenario.use_case,
            year: scenario.year,
            regions: scenario.region_ids.iter().map(RegionID::as_str).collect(),
            links: scenario.links.iter().map(|link| link.id.as_str()).collect(),
            components: scenario
                .components
                .iter()
                .map(|component| component.technology.name)
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// The target architecture for the build (e.g. x86_64-unknown-linux-gnu)
    target: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
    /// The version of rustc used to compile the program
    rustc_version: &'a str,
    /// When the program was built
    build_time_utc: &'a str,
    /// The git commit hash of the build (if known)
    git_commit_hash: String,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: git_commit_hash(),
        }
    }
}

/// Information about the platform the program is running on.
///
/// The fields correspond to different data available from the [`PlatformInfo`] struct.
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow!("Unable to determine platform info: {err}"))?;
        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            nodename: info.nodename().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            version: info.version().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write metadata to `metadata.toml` in the given output directory.
///
/// # Arguments
///
/// * `output_path` - Directory where `metadata.toml` will be written
/// * `command` - The command which produced the output
/// * `input_dir` - The raw data or results directory the command read from
/// * `scenario_path` - Path to the scenario file
/// * `scenario` - The loaded scenario
pub fn write_metadata(
    output_path: &Path,
    command: &str,
    input_dir: &Path,
    scenario_path: &Path,
    scenario: &Scenario,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            command,
            input_dir,
            datetime: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        },
        scenario: ScenarioMetadata::new(scenario_path, scenario),
        program: ProgramMetadata::default(),
        platform: PlatformMetadata::new()?,
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_metadata_works() {
        let dir = tempdir().unwrap();
        let scenario_path = dir.path().join("scenario.toml");
        fs::write(
            &scenario_path,
            "name = \"base\"\nuse_case = \"FlexMex1\"\nyear = 2050\nregions = [\"AT\", \"DE\"]\n\
            links = [\"AT-DE\"]\n\n[[components]]\nname = \"electricity-transmission\"\n",
        )
        .unwrap();
        let scenario = Scenario::from_path(&scenario_path).unwrap();

        write_metadata(
            dir.path(),
            "preprocess",
            Path::new("raw"),
            &scenario_path,
            &scenario,
        )
        .unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let metadata: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(metadata["run"]["command"].as_str(), Some("preprocess"));
        assert_eq!(metadata["run"]["input_dir"].as_str(), Some("raw"));
        assert_eq!(metadata["scenario"]["use_case"].as_str(), Some("FlexMex1"));
        assert_eq!(
            metadata["scenario"]["links"].as_array().unwrap()[0].as_str(),
            Some("AT-DE")
        );
        assert_eq!(metadata["program"]["name"].as_str(), Some("flexmex"));
    }
}
