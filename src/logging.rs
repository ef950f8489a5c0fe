//! Diagnostic tracing for debugging linedeal itself.
//!
//! Tracing goes to stderr and is never part of the dealt output. It is off
//! (`warn` and above) unless `LINEDEAL_DEBUG` or `RUST_LOG` asks for more.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that switches on debug tracing
pub const DEBUG_ENV: &str = "LINEDEAL_DEBUG";

/// First characters (case-insensitive) that count as "yes" in `LINEDEAL_DEBUG`
const AFFIRMATIVE: [char; 3] = ['1', 'y', 't'];

/// Whether a `LINEDEAL_DEBUG` value enables debug tracing
///
/// `1`, `yes`, `true`, `Y` and `T` all do; empty, `0`, `no` and `false` don't.
pub fn debug_enabled(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.chars().next())
        .is_some_and(|c| AFFIRMATIVE.contains(&c.to_ascii_lowercase()))
}

/// Initialize the tracing subscriber.
///
/// `LINEDEAL_DEBUG` forces `linedeal=debug`. Otherwise `RUST_LOG` is read,
/// defaulting to `warn` if unset. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// LINEDEAL_DEBUG=1 linedeal a.txt b.txt < input.txt
/// ```
pub fn init() {
    let debug = debug_enabled(std::env::var(DEBUG_ENV).ok().as_deref());
    let filter = if debug {
        EnvFilter::new("linedeal=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be set when linedeal is driven from tests.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_values_enable_debug() {
        for value in ["1", "yes", "Yes", "y", "true", "TRUE", "t"] {
            assert!(debug_enabled(Some(value)), "{value} should enable debug");
        }
    }

    #[test]
    fn test_other_values_keep_debug_off() {
        for value in ["", "0", "no", "false", "off", " yes"] {
            assert!(!debug_enabled(Some(value)), "{value:?} should not enable debug");
        }
        assert!(!debug_enabled(None));
    }
}
