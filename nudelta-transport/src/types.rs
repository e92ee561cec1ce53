//! Common types for transport layer

/// Device identification information
#[derive(Debug, Clone)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// Device path (hidraw node, IOService path, ...)
    pub device_path: String,
    /// USB interface number, -1 when the backend does not report one
    pub interface_number: i32,
    /// HID usage page of the opened interface
    pub usage_page: u16,
    /// bcdDevice release number from the USB descriptor
    pub release_number: u16,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl TransportDeviceInfo {
    /// True when the interface carries a vendor-defined usage page.
    pub fn is_vendor_interface(&self) -> bool {
        self.usage_page >= crate::protocol::device::VENDOR_USAGE_PAGE_MIN
    }
}

/// Discovered device that can be opened
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}

/// Retry and pacing policy for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Attempts per report transaction
    pub retries: usize,
    /// Delay between attempts (ms)
    pub retry_delay_ms: u64,
    /// Delay after each report write (ms)
    pub command_delay_ms: u64,
    /// Wall-clock budget for one logical operation (ms)
    pub operation_timeout_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        use crate::protocol::timing;
        Self {
            retries: timing::RETRIES,
            retry_delay_ms: timing::RETRY_DELAY_MS,
            command_delay_ms: timing::COMMAND_DELAY_MS,
            operation_timeout_ms: timing::OPERATION_TIMEOUT_MS,
        }
    }
}

impl Timing {
    /// No sleeping between transactions; used against the simulator.
    pub fn immediate() -> Self {
        Self {
            retry_delay_ms: 0,
            command_delay_ms: 0,
            ..Self::default()
        }
    }
}
