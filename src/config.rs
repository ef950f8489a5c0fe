//! Configuration file parsing and validation

pub mod linedeal_toml;

pub use linedeal_toml::{ColorOption, Config, ConfigError, OutputConfig, SummaryFormat};
