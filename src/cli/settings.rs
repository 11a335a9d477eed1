//! Code related to CLI commands for the settings file.
use crate::settings::{Settings, get_settings_file_path};
use anyhow::Result;
use clap::Subcommand;

/// Subcommands for settings
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Show the default settings file contents.
    ShowDefault,
    /// Show the path to the settings file.
    Path,
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::ShowDefault => print!("{}", Settings::default_file_contents()?),
            Self::Path => println!("{}", get_settings_file_path().display()),
        }

        Ok(())
    }
}
