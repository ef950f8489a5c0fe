#![forbid(unsafe_code)]

//! linedeal: deal lines round-robin across destinations
//!
//! Lines read from standard input are written, one at a time, to a fixed
//! rotation of destinations. Destinations are file paths or the aliases `-`
//! (standard output) and `+` (standard error). Repeated names share a single
//! open handle but keep their own places in the rotation.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;

pub use error::Error;
