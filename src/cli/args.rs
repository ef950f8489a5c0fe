#![forbid(unsafe_code)]

//! Command-line arguments

use crate::config;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Deal lines from standard input round-robin across destinations
#[derive(Debug, Parser)]
#[command(
    name = "linedeal",
    version,
    about,
    after_help = "A DESTINATION of '-' is standard output and '+' is standard error.\n\
                  With destinations A B C, line 1 goes to B, line 2 to C, line 3 to A, and so on."
)]
pub struct Cli {
    /// Files (or '-' / '+') to deal lines to, in rotation order
    #[arg(value_name = "DESTINATION", required_unless_present = "license")]
    pub destinations: Vec<String>,

    /// Append to files instead of overwriting them
    #[arg(short, long)]
    pub append: bool,

    /// Print license and copyright information, then exit
    #[arg(short = 'L', long)]
    pub license: bool,

    /// Print a summary of where lines went to stderr after a successful run
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub summary: Option<SummaryFormat>,

    /// When to colorize diagnostics and the human summary
    #[arg(long, value_enum, value_name = "WHEN")]
    pub color: Option<ColorChoice>,

    /// Read defaults from a TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Summary format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Human,
    Jsonl,
}

/// Color choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Converts to a termcolor choice; `Auto` only colors a terminal
    pub fn to_termcolor(self, is_terminal: bool) -> termcolor::ColorChoice {
        match self {
            ColorChoice::Always => termcolor::ColorChoice::Always,
            ColorChoice::Never => termcolor::ColorChoice::Never,
            ColorChoice::Auto if is_terminal => termcolor::ColorChoice::Auto,
            ColorChoice::Auto => termcolor::ColorChoice::Never,
        }
    }
}

impl From<config::SummaryFormat> for SummaryFormat {
    fn from(format: config::SummaryFormat) -> Self {
        match format {
            config::SummaryFormat::Human => SummaryFormat::Human,
            config::SummaryFormat::Jsonl => SummaryFormat::Jsonl,
        }
    }
}

impl From<config::ColorOption> for ColorChoice {
    fn from(option: config::ColorOption) -> Self {
        match option {
            config::ColorOption::Auto => ColorChoice::Auto,
            config::ColorOption::Always => ColorChoice::Always,
            config::ColorOption::Never => ColorChoice::Never,
        }
    }
}
