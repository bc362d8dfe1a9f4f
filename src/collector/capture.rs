//! The capture loop.
//!
//! Reads keys one at a time from a [`KeySource`], stamps each with a
//! [`Clock`] reading and echoes it, until the exit key arrives. The exit key
//! itself is never recorded.

use crate::collector::types::{KeystrokeEvent, ENTER, INTERRUPT, TAB};
use std::io::Write;
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur during keystroke capture.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Raw mode could not be entered (usually stdin is not a TTY).
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(String),
    /// Ctrl+C was pressed before the exit key.
    #[error("capture interrupted")]
    Interrupted,
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A blocking source of key presses.
pub trait KeySource {
    /// Block until the next key press and return its key code.
    fn next_key(&mut self) -> Result<u32, CollectorError>;
}

/// A monotonic clock reporting seconds since an arbitrary origin.
pub trait Clock {
    fn now(&self) -> f64;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Capture keystrokes until `exit_key` is pressed.
///
/// Every other key is timestamped right after it is read, echoed to `echo`
/// and recorded. Ctrl+C aborts with [`CollectorError::Interrupted`] unless it
/// is itself the exit key.
pub fn capture<S, C, W>(
    source: &mut S,
    clock: &C,
    echo: &mut W,
    exit_key: u32,
) -> Result<Vec<KeystrokeEvent>, CollectorError>
where
    S: KeySource + ?Sized,
    C: Clock + ?Sized,
    W: Write + ?Sized,
{
    let mut events = Vec::new();

    loop {
        let key = source.next_key()?;
        let timestamp = clock.now();

        if key == exit_key {
            break;
        }
        if key == INTERRUPT {
            return Err(CollectorError::Interrupted);
        }

        echo_key(echo, key)?;
        events.push(KeystrokeEvent::new(key, timestamp));
    }

    tracing::debug!(count = events.len(), "capture finished");
    Ok(events)
}

/// Echo a captured key. The terminal is raw, so Enter needs an explicit CRLF.
fn echo_key<W: Write + ?Sized>(echo: &mut W, key: u32) -> std::io::Result<()> {
    match key {
        ENTER => echo.write_all(b"\r\n")?,
        TAB => echo.write_all(b"\t")?,
        _ => {
            if let Some(c) = char::from_u32(key).filter(|c| !c.is_control()) {
                let mut buf = [0u8; 4];
                echo.write_all(c.encode_utf8(&mut buf).as_bytes())?;
            }
        }
    }
    echo.flush()
}
