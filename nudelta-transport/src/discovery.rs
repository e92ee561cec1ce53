//! Device discovery for the NuPhy Air60

use std::ffi::CString;

use hidapi::HidApi;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::hid_session::HidSession;
use crate::protocol::device;
use crate::types::{DiscoveredDevice, Timing, TransportDeviceInfo};

/// HID device discovery for the one supported product
pub struct HidDiscovery {
    api: HidApi,
}

impl HidDiscovery {
    /// Initialize the HID backend and take a device snapshot
    pub fn new() -> Result<Self, TransportError> {
        let api = HidApi::new()?;
        Ok(Self { api })
    }

    /// List every HID interface of a connected Air60
    pub fn list_devices(&self) -> Vec<DiscoveredDevice> {
        let devices: Vec<DiscoveredDevice> = self
            .api
            .device_list()
            .filter(|d| is_air60(d.vendor_id(), d.product_id()))
            .map(|d| {
                let info = TransportDeviceInfo {
                    vid: d.vendor_id(),
                    pid: d.product_id(),
                    device_path: d.path().to_string_lossy().to_string(),
                    interface_number: d.interface_number(),
                    usage_page: d.usage_page(),
                    release_number: d.release_number(),
                    serial: d.serial_number().map(|s| s.to_string()),
                    product_name: d.product_string().map(|s| s.to_string()),
                };
                debug!(
                    "Found interface: VID={:04X} PID={:04X} if={} page={:04X} path={}",
                    info.vid, info.pid, info.interface_number, info.usage_page, info.device_path
                );
                DiscoveredDevice { info }
            })
            .collect();

        info!("Found {} Air60 interfaces", devices.len());
        devices
    }

    /// Find the Air60, if one is plugged in
    pub fn find(&self) -> Option<DiscoveredDevice> {
        select_interface(self.list_devices())
    }

    /// Open a discovered device as an exclusive session
    pub fn open(
        &self,
        device: &DiscoveredDevice,
        timing: Timing,
    ) -> Result<HidSession, TransportError> {
        let path = CString::new(device.info.device_path.as_str()).map_err(|_| {
            TransportError::Hid(format!("invalid device path {}", device.info.device_path))
        })?;
        let handle = self.api.open_path(&path)?;
        Ok(HidSession::new(handle, device.info.clone(), timing))
    }
}

fn is_air60(vid: u16, pid: u16) -> bool {
    vid == device::VENDOR_ID && pid == device::PRODUCT_ID
}

/// Pick the interface to talk to: the first vendor-defined usage page
/// interface, else the first match.
pub fn select_interface(devices: Vec<DiscoveredDevice>) -> Option<DiscoveredDevice> {
    let vendor = devices.iter().position(|d| d.info.is_vendor_interface());
    match vendor {
        Some(i) => devices.into_iter().nth(i),
        None => devices.into_iter().next(),
    }
}

/// [`select_interface`], failing with `DeviceNotFound` when nothing matched.
pub fn require_interface(
    devices: Vec<DiscoveredDevice>,
) -> Result<DiscoveredDevice, TransportError> {
    select_interface(devices).ok_or_else(|| {
        TransportError::DeviceNotFound(format!(
            "Couldn't find a {} connected to this device. Make sure it's plugged in via USB.",
            device::PRODUCT_NAME
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(n: i32, usage_page: u16) -> DiscoveredDevice {
        DiscoveredDevice {
            info: TransportDeviceInfo {
                vid: device::VENDOR_ID,
                pid: device::PRODUCT_ID,
                device_path: format!("/dev/hidraw{n}"),
                interface_number: n,
                usage_page,
                release_number: 0x0110,
                serial: None,
                product_name: None,
            },
        }
    }

    #[test]
    fn product_filter() {
        assert!(is_air60(0x05AC, 0x024F));
        assert!(!is_air60(0x05AC, 0x0250));
        assert!(!is_air60(0x3151, 0x024F));
    }

    #[test]
    fn prefers_vendor_interface() {
        let picked = select_interface(vec![iface(0, 0x0001), iface(1, 0xFF60), iface(2, 0xFF00)]);
        assert_eq!(picked.unwrap().info.interface_number, 1);
    }

    #[test]
    fn falls_back_to_first_match() {
        let picked = select_interface(vec![iface(0, 0x0001), iface(1, 0x000C)]);
        assert_eq!(picked.unwrap().info.interface_number, 0);
    }

    #[test]
    fn nothing_connected() {
        assert!(select_interface(Vec::new()).is_none());
        match require_interface(Vec::new()) {
            Err(TransportError::DeviceNotFound(msg)) => assert!(msg.contains("plugged in")),
            other => panic!("expected DeviceNotFound, got {other:?}"),
        }
    }
}
