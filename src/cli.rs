//! CLI argument parsing and the top-level run loop

pub mod args;
pub mod run;

// Re-export types for convenient access
pub use args::{Cli, ColorChoice};
pub use run::{EXIT_ERROR, EXIT_SUCCESS, run};
