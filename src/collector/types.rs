//! Keystroke event types.
//!
//! An event is a key code plus the monotonic time it was observed at. Events
//! only live until they are folded into a profile.

/// Key code for the Escape key, the default capture terminator.
pub const ESCAPE: u32 = 27;

/// Key code reported for Enter.
pub const ENTER: u32 = 13;

/// Key code reported for Tab.
pub const TAB: u32 = 9;

/// Key code reported for Backspace.
pub const BACKSPACE: u32 = 127;

/// Key code reported for Ctrl+C while the terminal is raw.
pub const INTERRUPT: u32 = 3;

/// A single captured key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeystrokeEvent {
    /// Key code (Unicode scalar value for printable keys)
    pub key: u32,
    /// Monotonic timestamp in seconds, relative to an arbitrary origin
    pub timestamp: f64,
}

impl KeystrokeEvent {
    pub fn new(key: u32, timestamp: f64) -> Self {
        Self { key, timestamp }
    }

    /// Build an event from a character key.
    pub fn from_char(c: char, timestamp: f64) -> Self {
        Self::new(c as u32, timestamp)
    }

    /// The character this key code stands for, if it is one.
    pub fn as_char(&self) -> Option<char> {
        char::from_u32(self.key)
    }
}

/// Human-readable name for a key code, e.g. `a`, `<esc>` or `<0x1f>`.
pub fn describe_key(key: u32) -> String {
    match key {
        ESCAPE => "<esc>".to_string(),
        ENTER => "<enter>".to_string(),
        TAB => "<tab>".to_string(),
        BACKSPACE => "<backspace>".to_string(),
        32 => "<space>".to_string(),
        _ => match char::from_u32(key) {
            Some(c) if !c.is_control() => c.to_string(),
            _ => format!("<{key:#x}>"),
        },
    }
}
