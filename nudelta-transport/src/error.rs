//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("HID permission denied: {0}")]
    AccessDenied(String),

    /// Report transaction failed after the retry budget was spent
    #[error("Transport I/O error: {0}")]
    Io(String),

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Checksum mismatch in frame header: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("HID error: {0}")]
    Hid(String),
}

impl TransportError {
    /// True for the failures that abort a transfer mid-way (I/O, short reads,
    /// malformed responses, deadline expiry).
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::ShortRead { .. }
                | Self::Timeout(_)
                | Self::InvalidResponse(_)
                | Self::ChecksumMismatch { .. }
                | Self::Hid(_)
        )
    }
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") || msg.contains("EACCES") {
            TransportError::AccessDenied(msg)
        } else {
            TransportError::Hid(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_family_classification() {
        assert!(TransportError::Io("x".into()).is_io());
        assert!(TransportError::ShortRead {
            expected: 65,
            actual: 3
        }
        .is_io());
        assert!(TransportError::Timeout(100).is_io());
        assert!(!TransportError::DeviceNotFound("x".into()).is_io());
        assert!(!TransportError::AccessDenied("x".into()).is_io());
    }
}
