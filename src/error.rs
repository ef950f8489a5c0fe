#![forbid(unsafe_code)]

//! Error types shared by the resolver, the dispatcher and the CLI
//!
//! Every failure that ends a run is one of these variants. The CLI turns them
//! into a single diagnostic line and exit status 1, except for broken pipes,
//! which end the run quietly.

use crate::config::ConfigError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while opening destinations or dealing lines to them
#[derive(Debug, Error)]
pub enum Error {
    /// The destination, or a directory leading to it, does not exist
    #[error("cannot open '{}': {source}", path.display())]
    NotFound { path: PathBuf, source: io::Error },

    /// The destination exists but may not be written
    #[error("cannot open '{}': {source}", path.display())]
    PermissionDenied { path: PathBuf, source: io::Error },

    /// The destination names a directory
    #[error("cannot open '{}': Is a directory", path.display())]
    IsADirectory { path: PathBuf },

    /// The OS ran out of memory while opening the destination
    #[error("cannot open '{}': {source}", path.display())]
    OutOfMemory { path: PathBuf, source: io::Error },

    /// Any other OS failure while opening the destination
    #[error("cannot open '{}': {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    /// Writing or flushing a destination failed
    #[error("write error on {destination}: {source}")]
    Write {
        destination: String,
        source: io::Error,
    },

    /// Reading the input stream failed
    #[error("read error on standard input: {source}")]
    Read { source: io::Error },

    /// A rotation with no slots was asked to take a line
    #[error("no destinations to write to")]
    NoDestinations,

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing the dispatch summary failed
    #[error("cannot write summary: {source}")]
    Summary { source: io::Error },
}

impl Error {
    /// Classifies an `io::Error` raised while canonicalizing or opening `path`
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound { path, source },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied { path, source },
            io::ErrorKind::IsADirectory => Error::IsADirectory { path },
            io::ErrorKind::OutOfMemory => Error::OutOfMemory { path, source },
            _ => Error::Open { path, source },
        }
    }

    /// True when a destination's reader went away before we finished writing
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Error::Write { source, .. } | Error::Summary { source } => {
                source.kind() == io::ErrorKind::BrokenPipe
            }
            _ => false,
        }
    }

    /// Filesystem paths this error pertains to, in the order they were involved
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            Error::NotFound { path, .. }
            | Error::PermissionDenied { path, .. }
            | Error::IsADirectory { path }
            | Error::OutOfMemory { path, .. }
            | Error::Open { path, .. } => vec![path.as_path()],
            Error::Config(err) => err.path().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// One-line human-readable rendering of the error
    ///
    /// The OS message is merged with the offending path(s). A path is not
    /// repeated when the underlying message already names it, and embedded
    /// newlines (from TOML parse errors, for instance) are folded into spaces.
    pub fn diagnostic(&self) -> String {
        let mut message = self.to_string();
        for path in self.paths() {
            let quoted = format!("'{}'", path.display());
            if let Some(first) = message.find(&quoted) {
                let tail_start = first + quoted.len();
                let tail = message[tail_start..].replace(&quoted, "");
                message.truncate(tail_start);
                message.push_str(&tail);
            }
        }
        message
            .split(['\n', '\r'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
