//! Command framing: logical operations to fixed-size HID frames and back
//!
//! Every frame is exactly [`REPORT_SIZE`] bytes regardless of payload:
//!
//! ```text
//! [0]    report ID (0x06)
//! [1]    opcode
//! [2]    mode (0 = Windows, 1 = Mac)
//! [3]    chunk index
//! [4]    payload length in this frame
//! [5..8] reserved (zero)
//! [8]    checksum over bytes 1..8
//! [9..]  payload, zero-padded to 56 bytes
//! ```
//!
//! Multi-frame transfers are driven by [`ChunkWriter`] and [`ChunkReader`],
//! two small state machines that make the point of failure explicit.

use std::time::{Duration, Instant};

use tracing::{debug, info};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::TransportError;
use crate::protocol::{
    calculate_checksum, cmd, Mode, CHUNK_CAPACITY, HEADER_SIZE, REPORT_ID, REPORT_SIZE,
};
use crate::Transport;

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Logical device operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadFirmware,
    GetKeymap,
    SetKeymap,
    ResetKeymap,
}

impl Operation {
    /// Opcode placed in byte 1 of every frame
    pub fn opcode(self) -> u8 {
        match self {
            Operation::ReadFirmware => cmd::GET_FIRMWARE,
            Operation::GetKeymap => cmd::GET_KEYMAP,
            Operation::SetKeymap => cmd::SET_KEYMAP,
            Operation::ResetKeymap => cmd::RESET_KEYMAP,
        }
    }

    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            cmd::GET_FIRMWARE => Some(Operation::ReadFirmware),
            cmd::GET_KEYMAP => Some(Operation::GetKeymap),
            cmd::SET_KEYMAP => Some(Operation::SetKeymap),
            cmd::RESET_KEYMAP => Some(Operation::ResetKeymap),
            _ => None,
        }
    }

    /// Whether the operation carries a payload to the device
    pub fn is_write(self) -> bool {
        matches!(self, Operation::SetKeymap | Operation::ResetKeymap)
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct FrameHeader {
    report_id: u8,
    opcode: u8,
    mode: u8,
    chunk: u8,
    len: u8,
    _reserved: [u8; 3],
    checksum: u8,
}

/// One fixed-length HID report
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; REPORT_SIZE],
}

impl Frame {
    /// Build a frame; `payload` must fit in one chunk.
    pub fn new(opcode: u8, mode: Mode, chunk: u8, payload: &[u8]) -> Result<Self, TransportError> {
        if payload.len() > CHUNK_CAPACITY {
            return Err(TransportError::Io(format!(
                "payload of {} bytes exceeds chunk capacity {CHUNK_CAPACITY}",
                payload.len()
            )));
        }
        Ok(Self::build(opcode, mode.wire(), chunk, payload))
    }

    /// `payload.len()` must already be checked against the chunk capacity.
    fn build(opcode: u8, mode: u8, chunk: u8, payload: &[u8]) -> Self {
        let mut header = FrameHeader {
            report_id: REPORT_ID,
            opcode,
            mode,
            chunk,
            len: payload.len() as u8,
            _reserved: [0; 3],
            checksum: 0,
        };
        header.checksum = calculate_checksum(&header.as_bytes()[1..]);

        let mut bytes = [0u8; REPORT_SIZE];
        bytes[..HEADER_SIZE].copy_from_slice(header.as_bytes());
        bytes[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);
        Self { bytes }
    }

    /// Validate a received report: report ID, checksum and length field.
    pub fn parse(bytes: [u8; REPORT_SIZE]) -> Result<Self, TransportError> {
        let (header, _) = FrameHeader::read_from_prefix(&bytes[..])
            .map_err(|_| TransportError::InvalidResponse("truncated frame header".into()))?;

        if header.report_id != REPORT_ID {
            return Err(TransportError::InvalidResponse(format!(
                "report ID 0x{:02X}, expected 0x{REPORT_ID:02X}",
                header.report_id
            )));
        }

        let expected = calculate_checksum(&bytes[1..HEADER_SIZE]);
        if header.checksum != expected {
            return Err(TransportError::ChecksumMismatch {
                expected,
                actual: header.checksum,
            });
        }

        if header.len as usize > CHUNK_CAPACITY {
            return Err(TransportError::InvalidResponse(format!(
                "length field {} exceeds chunk capacity",
                header.len
            )));
        }

        Ok(Self { bytes })
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[1]
    }

    pub fn mode_byte(&self) -> u8 {
        self.bytes[2]
    }

    pub fn chunk(&self) -> u8 {
        self.bytes[3]
    }

    /// Payload bytes actually used (the length field)
    pub fn payload(&self) -> &[u8] {
        let len = self.bytes[4] as usize;
        &self.bytes[HEADER_SIZE..HEADER_SIZE + len]
    }

    /// Raw report, as written to the HID device
    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("opcode", &cmd::name(self.opcode()))
            .field("mode", &self.mode_byte())
            .field("chunk", &self.chunk())
            .field("len", &self.payload().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Encoding / decoding without I/O
// ---------------------------------------------------------------------------

/// Request frame for a read operation (no payload)
pub fn encode_request(op: Operation, mode: Mode) -> Frame {
    Frame::build(op.opcode(), mode.wire(), 0, &[])
}

/// Split a write payload into its ordered frames.
pub fn encode_chunks(op: Operation, mode: Mode, payload: &[u8]) -> Result<Vec<Frame>, TransportError> {
    if payload.is_empty() {
        return Err(TransportError::Io(format!(
            "{} needs a payload",
            cmd::name(op.opcode())
        )));
    }
    if payload.len() > CHUNK_CAPACITY * (u8::MAX as usize + 1) {
        return Err(TransportError::Io(format!(
            "payload of {} bytes needs more than 256 chunks",
            payload.len()
        )));
    }

    payload
        .chunks(CHUNK_CAPACITY)
        .enumerate()
        .map(|(i, chunk)| Frame::new(op.opcode(), mode, i as u8, chunk))
        .collect()
}

/// Reassemble a response payload from already received frames.
pub fn decode_chunks(
    op: Operation,
    mode: Mode,
    frames: &[Frame],
    expected_len: usize,
) -> Result<Vec<u8>, TransportError> {
    let mut payload = Vec::with_capacity(expected_len);
    for frame in frames {
        if payload.len() == expected_len {
            return Err(TransportError::InvalidResponse(format!(
                "unexpected frame after {expected_len} bytes"
            )));
        }
        accept_chunk(op, mode, frame, &mut payload, expected_len)?;
    }
    if payload.len() != expected_len {
        return Err(TransportError::ShortRead {
            expected: expected_len,
            actual: payload.len(),
        });
    }
    Ok(payload)
}

/// Check one response frame against the transfer so far and append it.
fn accept_chunk(
    op: Operation,
    mode: Mode,
    frame: &Frame,
    payload: &mut Vec<u8>,
    expected_len: usize,
) -> Result<(), TransportError> {
    if frame.opcode() != op.opcode() {
        return Err(TransportError::InvalidResponse(format!(
            "expected cmd 0x{:02X}, got 0x{:02X}",
            op.opcode(),
            frame.opcode()
        )));
    }
    if frame.mode_byte() != mode.wire() {
        return Err(TransportError::InvalidResponse(format!(
            "response for mode {}, expected {}",
            frame.mode_byte(),
            mode.wire()
        )));
    }

    let index = payload.len() / CHUNK_CAPACITY;
    if frame.chunk() as usize != index {
        return Err(TransportError::InvalidResponse(format!(
            "chunk {} out of order, expected {index}",
            frame.chunk()
        )));
    }

    let want = CHUNK_CAPACITY.min(expected_len - payload.len());
    let got = frame.payload().len();
    if got != want {
        return Err(TransportError::ShortRead {
            expected: want,
            actual: got,
        });
    }

    payload.extend_from_slice(frame.payload());
    Ok(())
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// Wall-clock budget for one logical operation
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after_ms(ms: u64) -> Self {
        Self {
            start: Instant::now(),
            budget: Duration::from_millis(ms),
        }
    }

    pub fn check(&self) -> Result<(), TransportError> {
        if self.start.elapsed() > self.budget {
            Err(TransportError::Timeout(self.budget.as_millis() as u64))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Write state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    Idle,
    /// Next chunk to send
    Sending(u8),
    Complete,
}

/// Sends a payload chunk by chunk, in ascending order.
///
/// A failed chunk leaves the writer in `Sending(index)` and the error is
/// returned; the chunks before it are already on the device.
pub struct ChunkWriter {
    frames: Vec<Frame>,
    state: WriteState,
}

impl ChunkWriter {
    pub fn new(op: Operation, mode: Mode, payload: &[u8]) -> Result<Self, TransportError> {
        Ok(Self {
            frames: encode_chunks(op, mode, payload)?,
            state: WriteState::Idle,
        })
    }

    pub fn state(&self) -> WriteState {
        self.state
    }

    pub fn chunk_count(&self) -> usize {
        self.frames.len()
    }

    /// Advance by one transition.
    pub fn step<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<WriteState, TransportError> {
        self.state = match self.state {
            WriteState::Idle => WriteState::Sending(0),
            WriteState::Sending(index) => {
                let frame = &self.frames[index as usize];
                transport.send_report(frame.as_bytes())?;
                if index as usize + 1 == self.frames.len() {
                    WriteState::Complete
                } else {
                    WriteState::Sending(index + 1)
                }
            }
            WriteState::Complete => WriteState::Complete,
        };
        Ok(self.state)
    }

    pub fn run<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        deadline: Deadline,
    ) -> Result<(), TransportError> {
        while self.state != WriteState::Complete {
            deadline.check()?;
            self.step(transport)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Read state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    Idle,
    /// Bytes accumulated so far
    Receiving(usize),
    Complete,
}

/// Sends one request frame, then reads response frames until exactly
/// `expected_len` bytes have arrived.
pub struct ChunkReader {
    op: Operation,
    mode: Mode,
    expected_len: usize,
    payload: Vec<u8>,
    state: ReadState,
}

impl ChunkReader {
    pub fn new(op: Operation, mode: Mode, expected_len: usize) -> Self {
        Self {
            op,
            mode,
            expected_len,
            payload: Vec::with_capacity(expected_len),
            state: ReadState::Idle,
        }
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Advance by one transition.
    pub fn step<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<ReadState, TransportError> {
        self.state = match self.state {
            ReadState::Idle => {
                let request = encode_request(self.op, self.mode);
                transport.send_report(request.as_bytes())?;
                ReadState::Receiving(0)
            }
            ReadState::Receiving(_) => {
                let frame = Frame::parse(transport.read_report()?)?;
                accept_chunk(
                    self.op,
                    self.mode,
                    &frame,
                    &mut self.payload,
                    self.expected_len,
                )?;
                if self.payload.len() == self.expected_len {
                    ReadState::Complete
                } else {
                    ReadState::Receiving(self.payload.len())
                }
            }
            ReadState::Complete => ReadState::Complete,
        };
        Ok(self.state)
    }

    pub fn run<T: Transport + ?Sized>(
        mut self,
        transport: &T,
        deadline: Deadline,
    ) -> Result<Vec<u8>, TransportError> {
        while self.state != ReadState::Complete {
            deadline.check()?;
            self.step(transport)?;
        }
        Ok(self.payload)
    }
}

// ---------------------------------------------------------------------------
// Transport-level entry points
// ---------------------------------------------------------------------------

/// Run a write operation to completion under the session's deadline.
pub fn write_chunked<T: Transport + ?Sized>(
    transport: &T,
    op: Operation,
    mode: Mode,
    payload: &[u8],
) -> Result<(), TransportError> {
    let deadline = Deadline::after_ms(transport.timing().operation_timeout_ms);
    let mut writer = ChunkWriter::new(op, mode, payload)?;
    debug!(
        "{} ({}): {} bytes in {} chunks",
        cmd::name(op.opcode()),
        mode,
        payload.len(),
        writer.chunk_count()
    );
    writer.run(transport, deadline)?;
    info!("{} ({}) complete", cmd::name(op.opcode()), mode);
    Ok(())
}

/// Run a read operation to completion under the session's deadline.
pub fn read_chunked<T: Transport + ?Sized>(
    transport: &T,
    op: Operation,
    mode: Mode,
    expected_len: usize,
) -> Result<Vec<u8>, TransportError> {
    let deadline = Deadline::after_ms(transport.timing().operation_timeout_ms);
    let payload = ChunkReader::new(op, mode, expected_len).run(transport, deadline)?;
    debug!(
        "{} ({}): received {} bytes",
        cmd::name(op.opcode()),
        mode,
        payload.len()
    );
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::keymap::{KEYMAP_BYTES, KEYMAP_CHUNKS};

    fn keymap_payload() -> Vec<u8> {
        (0..KEYMAP_BYTES).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn frame_layout() {
        let frame = Frame::new(cmd::SET_KEYMAP, Mode::Mac, 3, &[0xAA, 0xBB]).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes.len(), REPORT_SIZE);
        assert_eq!(&bytes[..5], &[REPORT_ID, cmd::SET_KEYMAP, 1, 3, 2]);
        assert_eq!(&bytes[5..8], &[0, 0, 0]);
        assert_eq!(bytes[8], calculate_checksum(&bytes[1..8]));
        assert_eq!(&bytes[9..11], &[0xAA, 0xBB]);
        assert!(bytes[11..].iter().all(|&b| b == 0));
    }

    #[test]
    fn oversized_payload_rejected() {
        let payload = [0u8; CHUNK_CAPACITY + 1];
        assert!(Frame::new(cmd::SET_KEYMAP, Mode::Windows, 0, &payload).is_err());
    }

    #[test]
    fn keymap_splits_into_nineteen_chunks() {
        let payload = keymap_payload();
        let frames = encode_chunks(Operation::SetKeymap, Mode::Windows, &payload).unwrap();
        assert_eq!(frames.len(), KEYMAP_CHUNKS);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.chunk() as usize, i);
            assert_eq!(frame.opcode(), cmd::SET_KEYMAP);
        }
        assert!(frames[..18].iter().all(|f| f.payload().len() == CHUNK_CAPACITY));
        assert_eq!(frames[18].payload().len(), 16);
        // Padding after the final 16 bytes stays zero
        assert!(frames[18].as_bytes()[HEADER_SIZE + 16..].iter().all(|&b| b == 0));

        let joined: Vec<u8> = frames.iter().flat_map(|f| f.payload().to_vec()).collect();
        assert_eq!(joined, payload);
    }

    #[test]
    fn decode_reassembles_in_order() {
        let payload = keymap_payload();
        let frames = encode_chunks(Operation::GetKeymap, Mode::Mac, &payload).unwrap();
        let decoded = decode_chunks(Operation::GetKeymap, Mode::Mac, &frames, KEYMAP_BYTES).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn decode_rejects_missing_tail() {
        let payload = keymap_payload();
        let frames = encode_chunks(Operation::GetKeymap, Mode::Mac, &payload).unwrap();
        let err = decode_chunks(Operation::GetKeymap, Mode::Mac, &frames[..18], KEYMAP_BYTES)
            .unwrap_err();
        assert!(matches!(err, TransportError::ShortRead { .. }));
    }

    #[test]
    fn decode_rejects_swapped_chunks() {
        let payload = keymap_payload();
        let mut frames = encode_chunks(Operation::GetKeymap, Mode::Mac, &payload).unwrap();
        frames.swap(2, 3);
        let err = decode_chunks(Operation::GetKeymap, Mode::Mac, &frames, KEYMAP_BYTES)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }

    #[test]
    fn decode_rejects_wrong_mode() {
        let payload = keymap_payload();
        let frames = encode_chunks(Operation::GetKeymap, Mode::Windows, &payload).unwrap();
        assert!(decode_chunks(Operation::GetKeymap, Mode::Mac, &frames, KEYMAP_BYTES).is_err());
    }

    #[test]
    fn decode_rejects_short_middle_chunk() {
        let frames = vec![
            Frame::new(cmd::GET_KEYMAP, Mode::Windows, 0, &[1u8; CHUNK_CAPACITY]).unwrap(),
            Frame::new(cmd::GET_KEYMAP, Mode::Windows, 1, &[1u8; 10]).unwrap(),
        ];
        let err = decode_chunks(Operation::GetKeymap, Mode::Windows, &frames, KEYMAP_BYTES)
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::ShortRead {
                expected: 56,
                actual: 10
            }
        ));
    }

    #[test]
    fn parse_detects_corruption() {
        let frame = Frame::new(cmd::GET_FIRMWARE, Mode::Windows, 0, &[0x10, 0x01]).unwrap();
        let mut bytes = *frame.as_bytes();
        bytes[3] ^= 0x01;
        assert!(matches!(
            Frame::parse(bytes),
            Err(TransportError::ChecksumMismatch { .. })
        ));

        let mut bytes = *frame.as_bytes();
        bytes[0] = 0x01;
        assert!(matches!(
            Frame::parse(bytes),
            Err(TransportError::InvalidResponse(_))
        ));
    }

    #[test]
    fn request_frame_is_empty() {
        let frame = encode_request(Operation::ReadFirmware, Mode::Windows);
        assert_eq!(frame.opcode(), cmd::GET_FIRMWARE);
        assert!(frame.payload().is_empty());
        assert!(Frame::parse(*frame.as_bytes()).is_ok());
    }

    #[test]
    fn operation_opcode_roundtrip() {
        for op in [
            Operation::ReadFirmware,
            Operation::GetKeymap,
            Operation::SetKeymap,
            Operation::ResetKeymap,
        ] {
            assert_eq!(Operation::from_opcode(op.opcode()), Some(op));
        }
        assert!(Operation::SetKeymap.is_write());
        assert!(!Operation::GetKeymap.is_write());
    }

    #[test]
    fn expired_deadline() {
        let deadline = Deadline::after_ms(0);
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(deadline.check(), Err(TransportError::Timeout(0))));
    }
}
