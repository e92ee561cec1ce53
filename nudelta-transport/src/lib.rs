//! Transport layer for the NuPhy Air60 keymap protocol
//!
//! This crate owns everything between a logical operation and the USB cable:
//!
//! - device discovery and the exclusive HID session
//! - fixed-size frame construction, checksumming and validation
//! - chunked multi-frame transfers with retries and an operation deadline
//!
//! The keymap semantics live one layer up in `nudelta-keyboard`.

pub mod error;
pub mod framer;
pub mod protocol;
pub mod types;

mod discovery;
mod hid_session;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use discovery::{require_interface, select_interface, HidDiscovery};
pub use error::TransportError;
pub use framer::{read_chunked, write_chunked, Deadline, Frame, Operation};
pub use hid_session::{FeatureReportDevice, HidSession};
pub use protocol::Mode;
pub use types::{DiscoveredDevice, Timing, TransportDeviceInfo};

/// Blocking report-level channel to one keyboard.
///
/// Every call is a complete feature-report transaction; retries happen
/// below this trait, chunking and deadlines above it.
pub trait Transport {
    /// Write one full-size frame
    fn send_report(&self, frame: &[u8]) -> Result<(), TransportError>;

    /// Read one full-size frame
    fn read_report(&self) -> Result<[u8; protocol::REPORT_SIZE], TransportError>;

    /// Identification of the opened interface
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Retry and deadline policy in effect
    fn timing(&self) -> Timing;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_report(&self, frame: &[u8]) -> Result<(), TransportError> {
        (**self).send_report(frame)
    }

    fn read_report(&self) -> Result<[u8; protocol::REPORT_SIZE], TransportError> {
        (**self).read_report()
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        (**self).device_info()
    }

    fn timing(&self) -> Timing {
        (**self).timing()
    }
}
