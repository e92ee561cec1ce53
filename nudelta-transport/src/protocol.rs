//! Protocol constants and utilities for NuPhy Air60 keyboard communication

use std::fmt;
use std::str::FromStr;

/// Command opcodes (byte 1 of every frame)
pub mod cmd {
    // SET commands
    pub const SET_KEYMAP: u8 = 0x0A;
    pub const RESET_KEYMAP: u8 = 0x0B;

    // GET commands
    pub const GET_KEYMAP: u8 = 0x8A;
    pub const GET_FIRMWARE: u8 = 0x8F;

    /// Get human-readable name for command byte
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            SET_KEYMAP => "SET_KEYMAP",
            RESET_KEYMAP => "RESET_KEYMAP",
            GET_KEYMAP => "GET_KEYMAP",
            GET_FIRMWARE => "GET_FIRMWARE",
            _ => "UNKNOWN",
        }
    }
}

/// HID report sizes
///
/// Frame layout:
/// `[report_id] [opcode] [mode] [chunk] [len] [0] [0] [0] [checksum] [payload; 56]`
pub const REPORT_SIZE: usize = 65;
/// Vendor feature report ID
pub const REPORT_ID: u8 = 0x06;
/// Report ID plus the 8 header bytes
pub const HEADER_SIZE: usize = 9;
/// Payload bytes carried by one frame
pub const CHUNK_CAPACITY: usize = REPORT_SIZE - HEADER_SIZE;

/// Keymap geometry
pub mod keymap {
    /// Number of keycode slots per mode
    pub const KEY_SLOTS: usize = 256;
    /// Bytes per keycode
    pub const KEYCODE_SIZE: usize = 4;
    /// Total keymap payload size
    pub const KEYMAP_BYTES: usize = KEY_SLOTS * KEYCODE_SIZE;
    /// Frames needed to carry a full keymap (18 full + 1 partial)
    pub const KEYMAP_CHUNKS: usize = KEYMAP_BYTES.div_ceil(super::CHUNK_CAPACITY);
}

/// HID communication timing constants
pub mod timing {
    /// Attempts per report transaction before giving up
    pub const RETRIES: usize = 3;
    /// Delay between retry attempts (ms)
    pub const RETRY_DELAY_MS: u64 = 20;
    /// Delay after each feature report write (ms)
    pub const COMMAND_DELAY_MS: u64 = 5;
    /// Wall-clock budget for one logical operation (ms)
    pub const OPERATION_TIMEOUT_MS: u64 = 10_000;
}

/// Device identification constants
pub mod device {
    /// NuPhy ships the Air60 under Apple's vendor ID
    pub const VENDOR_ID: u16 = 0x05AC;
    /// NuPhy Air60
    pub const PRODUCT_ID: u16 = 0x024F;
    /// First vendor-defined HID usage page
    pub const VENDOR_USAGE_PAGE_MIN: u16 = 0xFF00;
    /// Marketing name used in messages
    pub const PRODUCT_NAME: &str = "NuPhy Air60";
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Operating-system personality; each has its own keymap slot on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Windows,
    Mac,
}

impl Mode {
    /// Both modes in wire order.
    pub const ALL: [Mode; 2] = [Mode::Windows, Mode::Mac];

    /// Wire value placed in the frame's mode byte.
    pub fn wire(self) -> u8 {
        match self {
            Mode::Windows => 0,
            Mode::Mac => 1,
        }
    }

    /// Convert from the wire value.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Mode::Windows),
            1 => Some(Mode::Mac),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Windows => "Windows",
            Mode::Mac => "Mac",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Mode::Windows),
            "mac" | "macos" => Ok(Mode::Mac),
            _ => Err(format!("unknown mode: \"{s}\". Use windows or mac")),
        }
    }
}

/// Header checksum: sum of the 7 bytes after the report ID, stored as
/// `255 - (sum & 0xFF)` in the 8th.
pub fn calculate_checksum(header: &[u8]) -> u8 {
    let sum: u32 = header.iter().take(7).map(|&b| b as u32).sum();
    (255 - (sum & 0xFF)) as u8
}
