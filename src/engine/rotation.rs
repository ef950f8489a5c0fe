#![forbid(unsafe_code)]

//! The rotation of open handles that lines are dealt to
//!
//! A `RotationSequence` owns one `Sink` per unique destination and a ring of
//! slots, one per destination name. Several slots may point at the same sink
//! when a destination was named more than once.

use crate::error::Error;
use std::collections::VecDeque;
use std::io::Write;

/// One open destination and what has been written to it
#[derive(Debug)]
pub struct Sink<W> {
    label: String,
    writer: W,
    lines: u64,
    bytes: u64,
}

impl<W: Write> Sink<W> {
    fn new(label: String, writer: W) -> Self {
        Sink {
            label,
            writer,
            lines: 0,
            bytes: 0,
        }
    }

    fn write_line(&mut self, line: &[u8]) -> Result<(), Error> {
        self.writer
            .write_all(line)
            .map_err(|source| Error::Write {
                destination: self.label.clone(),
                source,
            })?;
        self.lines += 1;
        self.bytes += line.len() as u64;
        Ok(())
    }

    fn close(mut self) -> Result<(String, W, u64, u64), Error> {
        self.writer.flush().map_err(|source| Error::Write {
            destination: self.label.clone(),
            source,
        })?;
        Ok((self.label, self.writer, self.lines, self.bytes))
    }
}

/// Ordered, possibly repeating ring of handles
#[derive(Debug)]
pub struct RotationSequence<W> {
    sinks: Vec<Sink<W>>,
    slots: VecDeque<usize>,
}

impl<W: Write> RotationSequence<W> {
    /// Builds a rotation from unique writers and the slot order over them
    ///
    /// `slots[i]` is the index into `sinks` of the i-th destination name.
    /// Slots that point past the end of `sinks` are dropped.
    pub fn new(sinks: Vec<(String, W)>, slots: Vec<usize>) -> Self {
        let sinks: Vec<Sink<W>> = sinks
            .into_iter()
            .map(|(label, writer)| Sink::new(label, writer))
            .collect();
        let slots = slots.into_iter().filter(|&slot| slot < sinks.len()).collect();
        RotationSequence { sinks, slots }
    }

    /// Number of slots (destination names) in the rotation
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of distinct open handles
    pub fn handle_count(&self) -> usize {
        self.sinks.len()
    }

    /// Labels of the slots in their current order, starting at position 0
    pub fn labels(&self) -> Vec<&str> {
        self.slots
            .iter()
            .map(|&slot| self.sinks[slot].label.as_str())
            .collect()
    }

    /// Shifts the ring left by one and returns the sink index now at position 0
    pub fn advance(&mut self) -> Option<usize> {
        if self.slots.len() > 1 {
            self.slots.rotate_left(1);
        }
        self.slots.front().copied()
    }

    /// Advances the rotation and writes `line` to the destination at its front
    pub fn write_next(&mut self, line: &[u8]) -> Result<(), Error> {
        let slot = self.advance().ok_or(Error::NoDestinations)?;
        self.sinks[slot].write_line(line)
    }

    /// Flushes and releases every handle
    ///
    /// Consumes the rotation so handles are closed exactly once. Reports come
    /// back in the order destinations first appeared in the name list.
    pub fn close(self) -> Result<DispatchReport, Error> {
        Ok(self.close_into_writers()?.0)
    }

    pub(crate) fn close_into_writers(self) -> Result<(DispatchReport, Vec<W>), Error> {
        let mut slot_counts = vec![0usize; self.sinks.len()];
        for &slot in &self.slots {
            slot_counts[slot] += 1;
        }

        let mut report = DispatchReport::default();
        let mut writers = Vec::with_capacity(self.sinks.len());
        for (sink, slots) in self.sinks.into_iter().zip(slot_counts) {
            let (destination, writer, lines, bytes) = sink.close()?;
            report.lines += lines;
            report.bytes += bytes;
            report.destinations.push(DestinationReport {
                destination,
                slots,
                lines,
                bytes,
            });
            writers.push(writer);
        }
        Ok((report, writers))
    }
}

/// What one destination received during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationReport {
    pub destination: String,
    /// How many times the destination appears in the rotation
    pub slots: usize,
    pub lines: u64,
    pub bytes: u64,
}

/// Totals for a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub destinations: Vec<DestinationReport>,
    pub lines: u64,
    pub bytes: u64,
}
