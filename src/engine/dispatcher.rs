#![forbid(unsafe_code)]

//! Round-robin dispatch of input lines
//!
//! Lines are read as raw bytes up to and including `\n`, so input that is not
//! UTF-8 and a final line with no terminator both pass through unchanged.

use crate::engine::rotation::RotationSequence;
use crate::error::Error;
use std::io::{BufRead, Write};
use tracing::debug;

/// Counts of what was read from the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub lines: u64,
    pub bytes: u64,
}

/// Drains `input` into `rotation`, one line per destination in turn
///
/// For every line the rotation advances first and the line is then written
/// to the destination at its front. With destinations `[A, B, C]`, line 1
/// goes to B, line 2 to C and line 3 to A.
///
/// The first failed write ends the dispatch. Lines already written stay
/// where they are.
pub fn dispatch<R, W>(
    mut input: R,
    rotation: &mut RotationSequence<W>,
) -> Result<DispatchStats, Error>
where
    R: BufRead,
    W: Write,
{
    let mut stats = DispatchStats::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = input
            .read_until(b'\n', &mut line)
            .map_err(|source| Error::Read { source })?;
        if read == 0 {
            break;
        }

        rotation.write_next(&line)?;
        stats.lines += 1;
        stats.bytes += read as u64;
    }

    debug!(lines = stats.lines, bytes = stats.bytes, "input exhausted");
    Ok(stats)
}
