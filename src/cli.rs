//! The command line interface for the FlexMex tooling.
use crate::component::iter_technologies;
use crate::log;
use crate::output::create_output_directory;
use crate::pipeline::{
    element_table_names, prepare_datapackage, run_postprocessing, run_preprocessing,
};
use crate::scenario::Scenario;
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;

pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the FlexMex tooling.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for commands which write to an output directory
#[derive(Args)]
pub struct OutputOpts {
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Build an oemof.tabular datapackage for a scenario.
    Preprocess {
        /// Path to the scenario file.
        scenario: PathBuf,
        /// Directory containing the parameter table and raw time series.
        raw_dir: PathBuf,
        /// Directory for the datapackage.
        output_dir: PathBuf,
        /// Other output options
        #[command(flatten)]
        opts: OutputOpts,
    },
    /// Check that a datapackage can be built for a scenario, without writing it.
    Validate {
        /// Path to the scenario file.
        scenario: PathBuf,
        /// Directory containing the parameter table and raw time series.
        raw_dir: PathBuf,
    },
    /// Map the model results for a scenario onto the report templates.
    Postprocess {
        /// Path to the scenario file.
        scenario: PathBuf,
        /// Directory containing the model results.
        results_dir: PathBuf,
        /// Directory for the reports.
        output_dir: PathBuf,
        /// Other output options
        #[command(flatten)]
        opts: OutputOpts,
    },
    /// List the components which can be included in a scenario.
    Components,
    /// Manage example scenarios.
    Example {
        /// The available subcommands for managing example scenarios.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Preprocess {
                scenario,
                raw_dir,
                output_dir,
                opts,
            } => handle_preprocess_command(&scenario, &raw_dir, &output_dir, &opts, None),
            Self::Validate { scenario, raw_dir } => {
                handle_validate_command(&scenario, &raw_dir, None)
            }
            Self::Postprocess {
                scenario,
                results_dir,
                output_dir,
                opts,
            } => handle_postprocess_command(&scenario, &results_dir, &output_dir, &opts, None),
            Self::Components => {
                handle_components_command();
                Ok(())
            }
            Self::Example { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ flexmex --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    if let Some(command) = cli.command {
        command.execute()?;
    } else {
        // No command provided. Show help.
        Cli::command().print_long_help()?;
    }

    Ok(())
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Create the output directory and initialise the logger, which writes log files there
fn setup_output(output_path: &Path, opts: &OutputOpts, settings: Option<Settings>) -> Result<()> {
    let mut settings = load_settings(settings)?;

    // This setting can be overridden by command-line arguments
    if opts.overwrite {
        settings.overwrite = true;
    }

    let overwrite =
        create_output_directory(output_path, settings.overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path)).context("Failed to initialise logging.")?;

    info!("Starting flexmex v{}", env!("CARGO_PKG_VERSION"));
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    Ok(())
}

/// Handle the `preprocess` command.
pub fn handle_preprocess_command(
    scenario_path: &Path,
    raw_dir: &Path,
    output_path: &Path,
    opts: &OutputOpts,
    settings: Option<Settings>,
) -> Result<()> {
    setup_output(output_path, opts, settings)?;

    let scenario = Scenario::from_path(scenario_path).context("Failed to load scenario.")?;
    info!("Loaded scenario {} from {}", scenario.name, scenario_path.display());

    run_preprocessing(scenario_path, &scenario, raw_dir, output_path)
        .context("Failed to build datapackage.")?;
    info!("Preprocessing complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(
    scenario_path: &Path,
    raw_dir: &Path,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let scenario = Scenario::from_path(scenario_path).context("Failed to load scenario.")?;
    prepare_datapackage(&scenario, raw_dir).context("Failed to validate scenario.")?;
    info!(
        "Scenario validation successful! Element tables: {}",
        element_table_names(&scenario).join(", ")
    );

    Ok(())
}

/// Handle the `postprocess` command.
pub fn handle_postprocess_command(
    scenario_path: &Path,
    results_dir: &Path,
    output_path: &Path,
    opts: &OutputOpts,
    settings: Option<Settings>,
) -> Result<()> {
    setup_output(output_path, opts, settings)?;

    let scenario = Scenario::from_path(scenario_path).context("Failed to load scenario.")?;
    info!("Loaded scenario {} from {}", scenario.name, scenario_path.display());

    run_postprocessing(scenario_path, &scenario, results_dir, output_path)
        .context("Failed to map results.")?;
    info!("Postprocessing complete!");

    Ok(())
}

/// Handle the `components` command.
fn handle_components_command() {
    for technology in iter_technologies() {
        let buses = technology
            .buses
            .iter()
            .map(|connection| connection.carrier)
            .unique()
            .join("/");
        let expandable = if technology.can_expand() {
            ", expandable"
        } else {
            ""
        };
        println!(
            "{} ({}, {buses}{expandable})",
            technology.name, technology.kind
        );
    }
}
