#![forbid(unsafe_code)]

//! Human-readable summary and diagnostics with colorization support

use crate::engine::DispatchReport;
use crate::error::Error;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Program name shown in front of diagnostics
const PROGRAM: &str = "linedeal";

/// Human-readable output formatter
///
/// Everything goes to stderr, since stdout may itself be a destination.
pub struct HumanFormatter {
    color_choice: ColorChoice,
}

impl HumanFormatter {
    /// Creates a new HumanFormatter with the specified color choice
    pub fn new(color_choice: ColorChoice) -> Self {
        HumanFormatter { color_choice }
    }

    /// Format the dispatch report as plain text
    #[cfg(test)]
    pub(crate) fn format(&self, report: &DispatchReport) -> String {
        let mut out = termcolor::NoColor::new(Vec::new());
        // Writing into a Vec cannot fail
        let _ = write_report(&mut out, report);
        String::from_utf8_lossy(&out.into_inner()).into_owned()
    }

    /// Write the dispatch report to stderr with colors
    pub fn write_to_stderr(&self, report: &DispatchReport) -> io::Result<()> {
        let mut stderr = StandardStream::stderr(self.color_choice);
        write_report(&mut stderr, report)?;
        stderr.flush()
    }

    /// Format a diagnostic line as plain text, without the trailing newline
    #[cfg(test)]
    pub(crate) fn format_diagnostic(&self, error: &Error) -> String {
        let mut out = termcolor::NoColor::new(Vec::new());
        let _ = write_diagnostic(&mut out, error);
        let text = String::from_utf8_lossy(&out.into_inner()).into_owned();
        text.trim_end().to_string()
    }

    /// Write a one-line diagnostic for `error` to stderr
    pub fn report_error(&self, error: &Error) -> io::Result<()> {
        let mut stderr = StandardStream::stderr(self.color_choice);
        write_diagnostic(&mut stderr, error)
    }
}

fn write_report<W: WriteColor>(out: &mut W, report: &DispatchReport) -> io::Result<()> {
    for destination in &report.destinations {
        write!(out, "  ")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "{}", destination.destination)?;
        out.reset()?;
        write!(
            out,
            ": {}, {}",
            plural(destination.lines, "line"),
            plural(destination.bytes, "byte")
        )?;
        if destination.slots > 1 {
            write!(out, " [{} slots]", destination.slots)?;
        }
        writeln!(out)?;
    }

    if !report.destinations.is_empty() {
        writeln!(out)?;
    }

    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(
        out,
        "Dealt {} ({}) to {}",
        plural(report.lines, "line"),
        plural(report.bytes, "byte"),
        plural(report.destinations.len() as u64, "destination")
    )?;
    out.reset()?;
    writeln!(out)
}

fn write_diagnostic<W: WriteColor>(out: &mut W, error: &Error) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{PROGRAM}: ")?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "error: ")?;
    out.reset()?;
    writeln!(out, "{}", error.diagnostic())
}

fn plural(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
