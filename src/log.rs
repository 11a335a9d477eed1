//! Program logging.
//!
//! Messages of level `info` and below go to stdout and messages of level `warn` and above go to
//! stderr. If an output directory is given, messages are also written to log files there.
use anyhow::{Context, Result, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{Level, LevelFilter, Record};
use std::env;
use std::fmt::Arguments;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the `FLEXMEX_LOG_LEVEL`
/// environment variable or the settings file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable which overrides the log level in the settings file
const LOG_LEVEL_ENV_VAR: &str = "FLEXMEX_LOG_LEVEL";

/// The file name for the log file containing messages of all levels
const LOG_INFO_FILE_NAME: &str = "flexmex_info.log";

/// The file name for the log file containing warnings and errors only
const LOG_WARNING_FILE_NAME: &str = "flexmex_warn.log";

/// Set once the logger has been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

fn parse_log_level(level: &str) -> Result<LevelFilter> {
    let filter = match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => bail!("Unknown log level: {level}"),
    };

    Ok(filter)
}

/// Initialise the program logger.
///
/// Calling this function more than once has no effect.
///
/// # Arguments
///
/// * `log_level_from_settings` - The log level specified in the settings file
/// * `log_file_path` - The directory to write log files to, if any
pub fn init(log_level_from_settings: &str, log_file_path: Option<&Path>) -> Result<()> {
    if is_logger_initialised() {
        return Ok(());
    }

    // The environment variable takes precedence over the settings file
    let log_level = env::var(LOG_LEVEL_ENV_VAR)
        .unwrap_or_else(|_| log_level_from_settings.to_string());
    let log_level = parse_log_level(&log_level)?;

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let stdout_dispatch = Dispatch::new()
        .filter(|metadata| metadata.level() > Level::Warn)
        .format(console_formatter(colours, std::io::stdout().is_terminal()))
        .chain(std::io::stdout());
    let stderr_dispatch = Dispatch::new()
        .filter(|metadata| metadata.level() <= Level::Warn)
        .format(console_formatter(colours, std::io::stderr().is_terminal()))
        .chain(std::io::stderr());

    let mut dispatch = Dispatch::new()
        .level(log_level)
        .chain(stdout_dispatch)
        .chain(stderr_dispatch);

    if let Some(log_file_path) = log_file_path {
        let info_file = fern::log_file(log_file_path.join(LOG_INFO_FILE_NAME))
            .context("Could not create info log file")?;
        let warn_file = fern::log_file(log_file_path.join(LOG_WARNING_FILE_NAME))
            .context("Could not create warning log file")?;
        dispatch = dispatch
            .chain(Dispatch::new().format(file_formatter).chain(info_file))
            .chain(
                Dispatch::new()
                    .level(LevelFilter::Warn)
                    .format(file_formatter)
                    .chain(warn_file),
            );
    }

    dispatch.apply().context("Logger already set")?;
    let _ = LOGGER_INIT.set(());

    Ok(())
}

fn console_formatter(
    colours: ColoredLevelConfig,
    use_colour: bool,
) -> impl Fn(FormatCallback, &Arguments, &Record) + Sync + Send + 'static {
    move |out, message, record| {
        let timestamp = Local::now().format("%H:%M:%S");
        if use_colour {
            out.finish(format_args!(
                "[{timestamp} {} {}] {message}",
                colours.color(record.level()),
                record.target()
            ));
        } else {
            out.finish(format_args!(
                "[{timestamp} {} {}] {message}",
                record.level(),
                record.target()
            ));
        }
    }
}

fn file_formatter(out: FormatCallback, message: &Arguments, record: &Record) {
    out.finish(format_args!(
        "[{} {} {}] {message}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.target()
    ));
}
