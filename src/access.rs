//! HID access check
//!
//! Opening the keyboard needs read/write access to its HID node. When the
//! OS refuses, there is nothing to retry: the user has to grant access
//! (udev rule, Input Monitoring permission) and run the tool again.

use nudelta_transport::protocol::device;
use nudelta_transport::{HidDiscovery, Timing, TransportError};
use tracing::debug;

/// Outcome of the startup access probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
    /// No keyboard to probe, or the probe failed for another reason
    Unknown,
}

impl Access {
    /// Classify the result of trying to open the keyboard
    pub fn from_open<T>(result: &Result<T, TransportError>) -> Self {
        match result {
            Ok(_) => Access::Granted,
            Err(TransportError::AccessDenied(_)) => Access::Denied,
            Err(_) => Access::Unknown,
        }
    }
}

/// Try to open the keyboard once and release it again.
pub fn check_hid_access() -> Access {
    let discovery = match HidDiscovery::new() {
        Ok(discovery) => discovery,
        Err(e) => return Access::from_open::<()>(&Err(e)),
    };
    let Some(device) = discovery.find() else {
        debug!("No keyboard present, skipping access probe");
        return Access::Unknown;
    };
    let access = Access::from_open(&discovery.open(&device, Timing::default()));
    debug!("HID access for {}: {:?}", device.info.device_path, access);
    access
}

/// What the user has to do on this OS to let the tool open the keyboard
pub fn failure_message() -> String {
    if cfg!(target_os = "linux") {
        format!(
            "Cannot open the {name}: permission denied.\n\
             Allow your user to access it with a udev rule, for example in \
             /etc/udev/rules.d/50-nudelta.rules:\n\n    \
             SUBSYSTEM==\"hidraw\", ATTRS{{idVendor}}==\"{vid:04x}\", ATTRS{{idProduct}}==\"{pid:04x}\", MODE=\"0666\"\n\n\
             then run `sudo udevadm control --reload-rules && sudo udevadm trigger` and replug the keyboard.",
            name = device::PRODUCT_NAME,
            vid = device::VENDOR_ID,
            pid = device::PRODUCT_ID,
        )
    } else if cfg!(target_os = "macos") {
        format!(
            "Cannot open the {}: permission denied.\n\
             Grant your terminal access under System Settings > Privacy & Security > \
             Input Monitoring, then restart it and try again.",
            device::PRODUCT_NAME
        )
    } else {
        format!(
            "Cannot open the {}: permission denied. Run the tool from an account \
             that is allowed to access HID devices.",
            device::PRODUCT_NAME
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_open_results() {
        assert_eq!(Access::from_open(&Ok::<(), TransportError>(())), Access::Granted);
        assert_eq!(
            Access::from_open::<()>(&Err(TransportError::AccessDenied("EACCES".into()))),
            Access::Denied
        );
        assert_eq!(
            Access::from_open::<()>(&Err(TransportError::Hid("gone".into()))),
            Access::Unknown
        );
    }

    #[test]
    fn message_names_the_keyboard() {
        let msg = failure_message();
        assert!(msg.contains(device::PRODUCT_NAME));
        if cfg!(target_os = "linux") {
            assert!(msg.contains("idVendor}==\"05ac\""), "{msg}");
            assert!(msg.contains("idProduct}==\"024f\""), "{msg}");
        }
    }
}
