//! HID session: exclusive owner of the opened Air60 feature interface

use std::time::Duration;

use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::protocol::{REPORT_ID, REPORT_SIZE};
use crate::types::{Timing, TransportDeviceInfo};
use crate::Transport;

/// One blocking feature-report channel.
///
/// Implemented for `hidapi::HidDevice` and for the in-memory simulator, so
/// the retry and ownership logic in [`HidSession`] is shared by both.
pub trait FeatureReportDevice {
    /// Write one feature report (`data[0]` is the report ID)
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Read one feature report into `buf` (`buf[0]` preset to the report ID),
    /// returning the number of bytes the backend filled in
    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

impl FeatureReportDevice for HidDevice {
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        HidDevice::send_feature_report(self, data)?;
        Ok(())
    }

    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(HidDevice::get_feature_report(self, buf)?)
    }
}

/// Session over the Air60's vendor feature interface.
///
/// Owns the device handle for the whole invocation; dropping the session is
/// the only place the handle is released.
pub struct HidSession<D: FeatureReportDevice = HidDevice> {
    device: Mutex<D>,
    info: TransportDeviceInfo,
    timing: Timing,
}

impl<D: FeatureReportDevice> HidSession<D> {
    /// Wrap an already opened device
    pub fn new(device: D, info: TransportDeviceInfo, timing: Timing) -> Self {
        info!(
            "Opened {:04X}:{:04X} at {}",
            info.vid, info.pid, info.device_path
        );
        Self {
            device: Mutex::new(device),
            info,
            timing,
        }
    }

    fn pause(ms: u64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}

impl<D: FeatureReportDevice> Transport for HidSession<D> {
    fn send_report(&self, frame: &[u8]) -> Result<(), TransportError> {
        if frame.len() != REPORT_SIZE {
            return Err(TransportError::Io(format!(
                "refusing to send {}-byte frame (report size is {REPORT_SIZE})",
                frame.len()
            )));
        }
        debug!("Sending report: {:02X?}", &frame[..9]);

        let mut last_error = None;
        for attempt in 0..self.timing.retries {
            let result = self.device.lock().send_feature_report(frame);
            match result {
                Ok(()) => {
                    Self::pause(self.timing.command_delay_ms);
                    return Ok(());
                }
                Err(e @ TransportError::AccessDenied(_)) => return Err(e),
                Err(e) => {
                    warn!("Send attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                    Self::pause(self.timing.retry_delay_ms);
                }
            }
        }

        Err(TransportError::Io(format!(
            "report write failed after {} attempts: {}",
            self.timing.retries,
            last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string())
        )))
    }

    fn read_report(&self) -> Result<[u8; REPORT_SIZE], TransportError> {
        let mut last_error = None;
        for attempt in 0..self.timing.retries {
            let mut buf = [0u8; REPORT_SIZE];
            buf[0] = REPORT_ID;
            let result = self.device.lock().get_feature_report(&mut buf);
            match result {
                Ok(n) if n == REPORT_SIZE => {
                    debug!("Got report: {:02X?}", &buf[..9]);
                    return Ok(buf);
                }
                Ok(n) => {
                    warn!(
                        "Short read on attempt {}: {} of {} bytes",
                        attempt + 1,
                        n,
                        REPORT_SIZE
                    );
                    last_error = Some(TransportError::ShortRead {
                        expected: REPORT_SIZE,
                        actual: n,
                    });
                }
                Err(e @ TransportError::AccessDenied(_)) => return Err(e),
                Err(e) => {
                    warn!("Read attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
            Self::pause(self.timing.retry_delay_ms);
        }

        Err(TransportError::Io(format!(
            "report read failed after {} attempts: {}",
            self.timing.retries,
            last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string())
        )))
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn timing(&self) -> Timing {
        self.timing
    }
}

impl<D: FeatureReportDevice> Drop for HidSession<D> {
    fn drop(&mut self) {
        debug!("Releasing HID session for {}", self.info.device_path);
    }
}
