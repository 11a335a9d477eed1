//! Code related to the example scenarios and the CLI commands for interacting with them.
use super::{OutputOpts, handle_postprocess_command, handle_preprocess_command};
use crate::example::{Example, RESULTS_DIR_NAME, SCENARIO_FILE_NAME, get_example_names};
use crate::settings::Settings;
use anyhow::{Context, Result, ensure};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The available subcommands for managing example scenarios.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Provide information about the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Extract an example scenario and its data to a new directory.
    Extract {
        /// The name of the example to extract.
        name: String,
        /// The destination folder for the example.
        new_path: Option<PathBuf>,
    },
    /// Build the datapackage for an example.
    Preprocess {
        /// The name of the example.
        name: String,
        /// Directory for the datapackage.
        output_dir: PathBuf,
        /// Other output options
        #[command(flatten)]
        opts: OutputOpts,
    },
    /// Map an example's bundled model results onto its report templates.
    Postprocess {
        /// The name of the example.
        name: String,
        /// Directory for the reports.
        output_dir: PathBuf,
        /// Other output options
        #[command(flatten)]
        opts: OutputOpts,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Extract { name, new_path } => {
                handle_example_extract_command(&name, new_path.as_deref())?;
            }
            Self::Preprocess {
                name,
                output_dir,
                opts,
            } => handle_example_preprocess_command(&name, &output_dir, &opts, None)?,
            Self::Postprocess {
                name,
                output_dir,
                opts,
            } => handle_example_postprocess_command(&name, &output_dir, &opts, None)?,
        }

        Ok(())
    }
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for name in get_example_names() {
        println!("{name}");
    }
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    // If we can't load it, it's a bug, hence why we panic
    let info = Example::from_name(name)?
        .get_readme()
        .unwrap_or_else(|_| panic!("Could not load README.txt for '{name}' example"));
    print!("{info}");

    Ok(())
}

/// Handle the `example extract` command
fn handle_example_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    Example::from_name(name)?.extract(dest.unwrap_or(Path::new(name)))
}

/// Handle the `example preprocess` command.
///
/// The example is extracted to a temporary directory, which serves as both the location of the
/// scenario file and the raw data directory.
pub fn handle_example_preprocess_command(
    name: &str,
    output_dir: &Path,
    opts: &OutputOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let (_temp_dir, example_path) = extract_to_temp_dir(name)?;
    handle_preprocess_command(
        &example_path.join(SCENARIO_FILE_NAME),
        &example_path,
        output_dir,
        opts,
        settings,
    )
}

/// Handle the `example postprocess` command.
///
/// The results bundled with the example are mapped onto its report templates.
pub fn handle_example_postprocess_command(
    name: &str,
    output_dir: &Path,
    opts: &OutputOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let (_temp_dir, example_path) = extract_to_temp_dir(name)?;
    let results_dir = example_path.join(RESULTS_DIR_NAME);
    ensure!(results_dir.is_dir(), "Example '{name}' has no bundled results");

    handle_postprocess_command(
        &example_path.join(SCENARIO_FILE_NAME),
        &results_dir,
        output_dir,
        opts,
        settings,
    )
}

/// Extract an example into a new temporary directory, which is deleted when dropped
fn extract_to_temp_dir(name: &str) -> Result<(TempDir, PathBuf)> {
    let example = Example::from_name(name)?;
    let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
    let example_path = temp_dir.path().join(name);
    example
        .extract(&example_path)
        .context("Could not extract example")?;

    Ok((temp_dir, example_path))
}
