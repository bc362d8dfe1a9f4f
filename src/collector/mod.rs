//! Keystroke collection.
//!
//! This module reads key presses from the terminal and timestamps them.
//! The capture loop is written against the [`KeySource`] and [`Clock`]
//! traits; [`TerminalKeySource`] is the raw-mode terminal implementation.

pub mod capture;
pub mod terminal;
pub mod types;

// Re-export commonly used types
pub use capture::{capture, Clock, CollectorError, KeySource, MonotonicClock};
pub use terminal::{check_terminal, is_reachable_key, RawModeGuard, TerminalKeySource};
pub use types::{describe_key, KeystrokeEvent, ESCAPE};

use std::io::Write;

/// Prompt shown before capture starts.
pub const CAPTURE_PROMPT: &str = "please typing something. press (escape) to exit";

/// Print the capture prompt, then capture from the terminal.
///
/// Raw mode is only held inside this call.
pub fn capture_from_terminal<W: Write>(
    out: &mut W,
    exit_key: u32,
) -> Result<Vec<KeystrokeEvent>, CollectorError> {
    writeln!(out, "{CAPTURE_PROMPT}")?;
    out.flush()?;

    let events = {
        let mut source = TerminalKeySource::open()?;
        let clock = MonotonicClock::new();
        capture(&mut source, &clock, out, exit_key)
    };

    writeln!(out)?;
    events
}
