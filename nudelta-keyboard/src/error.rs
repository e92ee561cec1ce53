//! Keyboard interface error types

use nudelta_transport::TransportError;
use thiserror::Error;

/// Errors from keyboard and keymap operations
#[derive(Error, Debug)]
pub enum KeyboardError {
    /// Transport layer error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Profile names an action that is not in the keycode table
    #[error("Unknown action \"{0}\"")]
    UnknownAction(String),

    /// Profile names a position that is not one of the 256 matrix slots
    #[error("Unknown key position \"{0}\"")]
    UnknownPosition(String),

    /// Keymap holds a value with no symbolic name
    #[error("Keycode 0x{value:08X} at {position} has no symbolic name")]
    UnknownKeycode { position: String, value: u32 },

    /// Buffer of the wrong size
    #[error("Invalid keymap length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Structured profile could not be parsed or written
    #[error("Invalid profile: {0}")]
    Profile(String),
}

impl From<serde_yaml::Error> for KeyboardError {
    fn from(e: serde_yaml::Error) -> Self {
        KeyboardError::Profile(e.to_string())
    }
}
