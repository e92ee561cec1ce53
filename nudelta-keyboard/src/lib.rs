//! High-level interface for the NuPhy Air60 keymap
//!
//! This crate provides the keymap model (keycodes, layout, factory defaults,
//! binary/hex/YAML codecs) and the [`Air60`] handle that moves keymaps to and
//! from the keyboard over any [`Transport`].

pub mod action;
pub mod defaults;
pub mod error;
pub mod hid_codes;
pub mod keymap;
pub mod layout;
pub mod profile;

pub use action::{Action, Keycode};
pub use defaults::factory_default;
pub use error::KeyboardError;
pub use keymap::Keymap;
pub use layout::Position;
pub use profile::Profile;

pub use nudelta_transport::Mode;

use std::fmt;

use nudelta_transport::framer::{read_chunked, write_chunked, Operation};
use nudelta_transport::protocol::keymap::KEYMAP_BYTES;
use nudelta_transport::{
    require_interface, DiscoveredDevice, HidDiscovery, HidSession, Timing, Transport,
    TransportError,
};
use tracing::{debug, info};

/// Firmware version as reported by the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FirmwareVersion {
    pub raw: u16,
}

impl FirmwareVersion {
    pub fn new(raw: u16) -> Self {
        Self { raw }
    }
}

/// Four lowercase hex digits, the way the vendor tool shows it
impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.raw)
    }
}

/// An opened Air60.
///
/// The firmware version is read once when the handle is created. Dropping the
/// handle drops the transport, which releases the device.
pub struct Air60<T: Transport = HidSession> {
    transport: T,
    firmware: FirmwareVersion,
}

impl Air60<HidSession> {
    /// Find the connected Air60, open it and read its firmware version.
    pub fn find(timing: Timing) -> Result<Self, KeyboardError> {
        let discovery = HidDiscovery::new()?;
        Air60::connect(discovery.list_devices(), |device| {
            discovery.open(device, timing)
        })
    }
}

impl<T: Transport> Air60<T> {
    /// Pick the Air60 interface among `devices` and open it with `open`.
    ///
    /// Fails with `DeviceNotFound` before `open` is called when nothing
    /// matched.
    pub fn connect<F>(devices: Vec<DiscoveredDevice>, open: F) -> Result<Self, KeyboardError>
    where
        F: FnOnce(&DiscoveredDevice) -> Result<T, TransportError>,
    {
        let device = require_interface(devices)?;
        Air60::open(open(&device)?)
    }

    /// Wrap an open transport and read the firmware version.
    pub fn open(transport: T) -> Result<Self, KeyboardError> {
        let firmware = read_firmware(&transport)?;
        info!(
            "Air60 at {} firmware {}",
            transport.device_info().device_path,
            firmware
        );
        Ok(Self {
            transport,
            firmware,
        })
    }

    /// System path of the opened interface
    pub fn path(&self) -> &str {
        &self.transport.device_info().device_path
    }

    /// Firmware version read at open time
    pub fn firmware(&self) -> FirmwareVersion {
        self.firmware
    }

    /// Query the firmware version again
    pub fn read_firmware(&self) -> Result<FirmwareVersion, KeyboardError> {
        read_firmware(&self.transport)
    }

    /// Read the keymap stored for `mode`
    pub fn get_keymap(&self, mode: Mode) -> Result<Keymap, KeyboardError> {
        let bytes = read_chunked(&self.transport, Operation::GetKeymap, mode, KEYMAP_BYTES)?;
        Keymap::from_binary(&bytes)
    }

    /// Replace the keymap stored for `mode`.
    ///
    /// A transport failure part-way through leaves the device holding a mix
    /// of the old and new keymap for this mode; there is no commit step to
    /// roll back.
    pub fn set_keymap(&self, mode: Mode, keymap: &Keymap) -> Result<(), KeyboardError> {
        debug!("Writing {} keymap", mode);
        write_chunked(
            &self.transport,
            Operation::SetKeymap,
            mode,
            &keymap.to_binary(),
        )?;
        Ok(())
    }

    /// Restore the factory keymap for `mode`
    pub fn reset_keymap(&self, mode: Mode) -> Result<(), KeyboardError> {
        debug!("Resetting {} keymap", mode);
        write_chunked(
            &self.transport,
            Operation::ResetKeymap,
            mode,
            &factory_default(mode).to_binary(),
        )?;
        Ok(())
    }
}

fn read_firmware<T: Transport + ?Sized>(transport: &T) -> Result<FirmwareVersion, KeyboardError> {
    let bytes = read_chunked(transport, Operation::ReadFirmware, Mode::Windows, 2)?;
    let raw = match bytes.as_slice() {
        [lo, hi] => u16::from_le_bytes([*lo, *hi]),
        other => {
            return Err(TransportError::ShortRead {
                expected: 2,
                actual: other.len(),
            }
            .into())
        }
    };
    Ok(FirmwareVersion::new(raw))
}
