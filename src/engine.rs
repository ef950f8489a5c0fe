//! Destination resolution and round-robin dispatch

pub mod dispatcher;
pub mod resolver;
pub mod rotation;

pub use dispatcher::{DispatchStats, dispatch};
pub use resolver::{CanonicalIdentity, OpenMode, STDERR_TOKEN, STDOUT_TOKEN, resolve};
pub use rotation::{DestinationReport, DispatchReport, RotationSequence};
