//! Raw terminal key source.
//!
//! Raw mode is held by a [`RawModeGuard`] for exactly as long as the
//! [`TerminalKeySource`] lives, so the previous terminal mode comes back on
//! every exit path, errors and panics included.

use crate::collector::capture::{CollectorError, KeySource};
use crate::collector::types::{BACKSPACE, ENTER, ESCAPE, TAB};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::IsTerminal;

/// Check whether stdin is an interactive terminal.
pub fn check_terminal() -> bool {
    std::io::stdin().is_terminal()
}

/// Scoped raw mode. Restores the previous mode when dropped.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Put the terminal into raw mode.
    pub fn acquire() -> Result<Self, CollectorError> {
        if !check_terminal() {
            return Err(CollectorError::TerminalUnavailable(
                "stdin is not a terminal".to_string(),
            ));
        }

        terminal::enable_raw_mode()
            .map_err(|e| CollectorError::TerminalUnavailable(e.to_string()))?;
        tracing::debug!("raw mode enabled");

        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        match terminal::disable_raw_mode() {
            Ok(()) => tracing::debug!("raw mode restored"),
            Err(e) => tracing::warn!("Failed to restore terminal mode: {}", e),
        }
    }
}

/// Key source reading presses from the controlling terminal.
#[derive(Debug)]
pub struct TerminalKeySource {
    _guard: RawModeGuard,
}

impl TerminalKeySource {
    /// Enter raw mode and start reading keys.
    pub fn open() -> Result<Self, CollectorError> {
        Ok(Self {
            _guard: RawModeGuard::acquire()?,
        })
    }
}

impl KeySource for TerminalKeySource {
    fn next_key(&mut self) -> Result<u32, CollectorError> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(code) = key_code(&key) {
                    return Ok(code);
                }
            }
        }
    }
}

/// Map a terminal key event to a key code. Keys with no code are ignored.
///
/// Ctrl+letter yields the matching control code, so Ctrl+C is 3;
/// Alt-modified characters and other Ctrl chords have no code.
fn key_code(key: &KeyEvent) -> Option<u32> {
    match key.code {
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::ALT) => None,
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            c.is_ascii_alphabetic()
                .then(|| c.to_ascii_lowercase() as u32 & 0x1f)
        }
        KeyCode::Char(c) => Some(c as u32),
        KeyCode::Esc => Some(ESCAPE),
        KeyCode::Enter => Some(ENTER),
        KeyCode::Tab => Some(TAB),
        KeyCode::Backspace => Some(BACKSPACE),
        _ => None,
    }
}

/// Whether a terminal key press can ever produce `code`.
pub fn is_reachable_key(code: u32) -> bool {
    match code {
        1..=26 | ESCAPE | BACKSPACE => true,
        _ => char::from_u32(code).is_some_and(|c| !c.is_control()),
    }
}
