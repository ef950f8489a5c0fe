#![forbid(unsafe_code)]

use clap::Parser;
use linedeal::cli::{self, Cli};

fn main() {
    linedeal::logging::init();

    // An interrupt is the user asking us to stop, not a failure
    if let Err(e) = ctrlc::set_handler(|| std::process::exit(cli::EXIT_SUCCESS)) {
        tracing::warn!(error = %e, "cannot install interrupt handler");
    }

    let cli = Cli::parse();
    std::process::exit(cli::run(cli));
}
