//! In-memory Air60 for exercising the full stack without hardware
//!
//! The simulator speaks the same frame protocol as the keyboard: it keeps one
//! keymap per mode, answers firmware and keymap requests with properly framed
//! responses, and applies write chunks in place as they arrive (there is no
//! commit step, exactly like the device). Fault injection covers transient
//! short reads, a truncated keymap response and a failing write chunk.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::framer::{encode_chunks, Frame, Operation};
use crate::hid_session::{FeatureReportDevice, HidSession};
use crate::protocol::keymap::KEYMAP_BYTES;
use crate::protocol::{device, Mode, CHUNK_CAPACITY, REPORT_SIZE};
use crate::types::{Timing, TransportDeviceInfo};

struct SimState {
    firmware: u16,
    keymaps: [[u8; KEYMAP_BYTES]; 2],
    pending: VecDeque<[u8; REPORT_SIZE]>,
    short_reads: usize,
    truncate_keymap: bool,
    fail_write_at_chunk: Option<u8>,
    frames_received: usize,
    write_chunks_applied: usize,
}

/// Cloneable handle to a simulated keyboard; clones share state so a test can
/// keep one handle while the session owns another.
#[derive(Clone)]
pub struct SimulatedAir60 {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedAir60 {
    pub fn new(firmware: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                firmware,
                keymaps: [[0; KEYMAP_BYTES]; 2],
                pending: VecDeque::new(),
                short_reads: 0,
                truncate_keymap: false,
                fail_write_at_chunk: None,
                frames_received: 0,
                write_chunks_applied: 0,
            })),
        }
    }

    /// Device info as discovery would report it
    pub fn info(&self) -> TransportDeviceInfo {
        TransportDeviceInfo {
            vid: device::VENDOR_ID,
            pid: device::PRODUCT_ID,
            device_path: "sim://air60".into(),
            interface_number: 1,
            usage_page: 0xFF60,
            release_number: self.state.lock().firmware,
            serial: None,
            product_name: Some(device::PRODUCT_NAME.into()),
        }
    }

    /// Open a session on this simulator with no pacing delays
    pub fn session(&self) -> HidSession<SimulatedAir60> {
        HidSession::new(self.clone(), self.info(), Timing::immediate())
    }

    /// Open a session with explicit timing
    pub fn session_with(&self, timing: Timing) -> HidSession<SimulatedAir60> {
        HidSession::new(self.clone(), self.info(), timing)
    }

    pub fn keymap(&self, mode: Mode) -> [u8; KEYMAP_BYTES] {
        self.state.lock().keymaps[mode.wire() as usize]
    }

    pub fn set_keymap(&self, mode: Mode, bytes: &[u8; KEYMAP_BYTES]) {
        self.state.lock().keymaps[mode.wire() as usize] = *bytes;
    }

    /// The next `count` report reads come back short
    pub fn inject_short_reads(&self, count: usize) {
        self.state.lock().short_reads = count;
    }

    /// Answer keymap requests with 4 bytes missing from the final chunk
    pub fn truncate_keymap_responses(&self) {
        self.state.lock().truncate_keymap = true;
    }

    /// Reject every write frame carrying this chunk index
    pub fn fail_writes_at_chunk(&self, chunk: u8) {
        self.state.lock().fail_write_at_chunk = Some(chunk);
    }

    /// Frames the device accepted, requests and write chunks alike
    pub fn frames_received(&self) -> usize {
        self.state.lock().frames_received
    }

    /// Write chunks applied to either keymap
    pub fn write_chunks_applied(&self) -> usize {
        self.state.lock().write_chunks_applied
    }
}

impl FeatureReportDevice for SimulatedAir60 {
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        let bytes: [u8; REPORT_SIZE] = data.try_into().map_err(|_| {
            TransportError::Hid(format!("simulator got a {}-byte report", data.len()))
        })?;
        let frame = Frame::parse(bytes)?;
        let mode = Mode::from_wire(frame.mode_byte()).ok_or_else(|| {
            TransportError::InvalidResponse(format!("unknown mode {}", frame.mode_byte()))
        })?;
        let op = Operation::from_opcode(frame.opcode()).ok_or_else(|| {
            TransportError::InvalidResponse(format!("unknown opcode 0x{:02X}", frame.opcode()))
        })?;

        let mut state = self.state.lock();
        if op.is_write() && state.fail_write_at_chunk == Some(frame.chunk()) {
            return Err(TransportError::Hid("simulated write failure".into()));
        }
        state.frames_received += 1;

        match op {
            Operation::ReadFirmware => {
                let response = Frame::new(op.opcode(), mode, 0, &state.firmware.to_le_bytes())?;
                state.pending.push_back(*response.as_bytes());
            }
            Operation::GetKeymap => {
                let keymap = state.keymaps[mode.wire() as usize];
                let body = if state.truncate_keymap {
                    &keymap[..KEYMAP_BYTES - 4]
                } else {
                    &keymap[..]
                };
                for response in encode_chunks(op, mode, body)? {
                    state.pending.push_back(*response.as_bytes());
                }
            }
            Operation::SetKeymap | Operation::ResetKeymap => {
                let offset = frame.chunk() as usize * CHUNK_CAPACITY;
                let payload = frame.payload();
                if offset + payload.len() > KEYMAP_BYTES {
                    return Err(TransportError::InvalidResponse(format!(
                        "chunk {} overruns the keymap",
                        frame.chunk()
                    )));
                }
                state.keymaps[mode.wire() as usize][offset..offset + payload.len()]
                    .copy_from_slice(payload);
                state.write_chunks_applied += 1;
            }
        }
        Ok(())
    }

    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        if state.short_reads > 0 {
            state.short_reads -= 1;
            return Ok(7);
        }
        let report = state
            .pending
            .pop_front()
            .ok_or_else(|| TransportError::Hid("no response pending".into()))?;
        let n = buf.len().min(REPORT_SIZE);
        buf[..n].copy_from_slice(&report[..n]);
        Ok(n)
    }
}
