#![forbid(unsafe_code)]

//! Top-level run: settings, resolution, dispatch and reporting
//!
//! Maps every outcome to an exit code:
//! - 0: all input dealt, `--license` printed, or a reader went away (broken pipe)
//! - 1: a destination could not be opened or written, or the config is bad

use crate::cli::args::{Cli, ColorChoice, SummaryFormat};
use crate::config::Config;
use crate::engine::{self, DispatchReport, OpenMode};
use crate::error::Error;
use crate::output::{HumanFormatter, JsonlFormatter};
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::debug;

/// Exit codes for the linedeal binary
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;

const LICENSE_TEXT: &str = include_str!("../../LICENSE");

/// Effective options after merging the command line with the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub destinations: Vec<String>,
    pub mode: OpenMode,
    pub summary: Option<SummaryFormat>,
    pub color: ColorChoice,
}

impl Settings {
    /// Loads the config file named by `--config`, if any, and merges it
    pub fn from_cli(cli: &Cli) -> Result<Self, Error> {
        let config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(Self::merge(cli, &config))
    }

    /// Command-line flags win over the config file, which wins over defaults
    pub fn merge(cli: &Cli, config: &Config) -> Self {
        Settings {
            destinations: cli.destinations.clone(),
            mode: OpenMode::from(cli.append || config.output.append),
            summary: cli.summary.or(config.output.summary.map(SummaryFormat::from)),
            color: cli.color.unwrap_or(ColorChoice::from(config.output.color)),
        }
    }
}

/// Run linedeal with parsed arguments, reading lines from stdin
///
/// Returns the process exit code.
pub fn run(cli: Cli) -> i32 {
    if cli.license {
        // Nothing useful can be done if stdout is already closed
        let _ = io::stdout().lock().write_all(LICENSE_TEXT.as_bytes());
        return EXIT_SUCCESS;
    }

    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => return report_failure(&e, cli.color.unwrap_or_default()),
    };

    let report = match deal(&settings, io::stdin().lock()) {
        Ok(report) => report,
        Err(e) => return report_failure(&e, settings.color),
    };

    match write_summary(&settings, &report) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_failure(&e, settings.color),
    }
}

/// Opens the destinations, deals `input` across them and closes them
pub fn deal<R: BufRead>(settings: &Settings, input: R) -> Result<DispatchReport, Error> {
    let mut rotation = engine::resolve(settings.destinations.as_slice(), settings.mode)?;
    debug!(
        slots = rotation.len(),
        handles = rotation.handle_count(),
        order = ?rotation.labels(),
        "destinations resolved"
    );

    engine::dispatch(input, &mut rotation)?;
    rotation.close()
}

fn write_summary(settings: &Settings, report: &DispatchReport) -> Result<(), Error> {
    let result = match settings.summary {
        None => return Ok(()),
        Some(SummaryFormat::Human) => HumanFormatter::new(stderr_colors(settings.color))
            .write_to_stderr(report),
        Some(SummaryFormat::Jsonl) => JsonlFormatter::new().write_to_stderr(report),
    };
    result.map_err(|source| Error::Summary { source })
}

fn report_failure(error: &Error, color: ColorChoice) -> i32 {
    if error.is_broken_pipe() {
        debug!(%error, "reader closed early, stopping");
        return EXIT_SUCCESS;
    }

    let formatter = HumanFormatter::new(stderr_colors(color));
    // If stderr itself is gone, the exit code is all that is left
    let _ = formatter.report_error(error);
    EXIT_ERROR
}

fn stderr_colors(color: ColorChoice) -> termcolor::ColorChoice {
    color.to_termcolor(io::stderr().is_terminal())
}
