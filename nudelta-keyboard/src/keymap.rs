//! Keymap buffer and its binary and hex encodings

use std::fmt;
use std::fmt::Write as _;

use nudelta_transport::protocol::keymap::{KEYCODE_SIZE, KEYMAP_BYTES, KEY_SLOTS};

use crate::action::Keycode;
use crate::error::KeyboardError;
use crate::layout::Position;

/// Bytes per line in the hex rendering
const HEX_BYTES_PER_LINE: usize = 16;

/// One mode's full key assignment: exactly 256 keycodes
#[derive(Clone, PartialEq, Eq)]
pub struct Keymap {
    keys: [Keycode; KEY_SLOTS],
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            keys: [Keycode::DISABLED; KEY_SLOTS],
        }
    }
}

impl Keymap {
    pub const fn from_keycodes(keys: [Keycode; KEY_SLOTS]) -> Self {
        Self { keys }
    }

    pub fn keycodes(&self) -> &[Keycode; KEY_SLOTS] {
        &self.keys
    }

    pub fn get(&self, pos: Position) -> Keycode {
        self.keys[pos.index()]
    }

    pub fn set(&mut self, pos: Position, code: Keycode) {
        self.keys[pos.index()] = code;
    }

    /// Device byte order: 256 little-endian u32 values
    pub fn to_binary(&self) -> [u8; KEYMAP_BYTES] {
        let mut bytes = [0u8; KEYMAP_BYTES];
        for (chunk, code) in bytes.chunks_exact_mut(KEYCODE_SIZE).zip(self.keys.iter()) {
            chunk.copy_from_slice(&code.to_bytes());
        }
        bytes
    }

    /// Decode a full buffer; anything but exactly 1024 bytes is an error.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, KeyboardError> {
        if bytes.len() != KEYMAP_BYTES {
            return Err(KeyboardError::InvalidLength {
                expected: KEYMAP_BYTES,
                actual: bytes.len(),
            });
        }
        let mut keys = [Keycode::DISABLED; KEY_SLOTS];
        for (code, chunk) in keys.iter_mut().zip(bytes.chunks_exact(KEYCODE_SIZE)) {
            *code = Keycode::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self { keys })
    }

    /// Replace the leading bytes of the buffer with `bytes`.
    ///
    /// At most 1024 bytes are consumed; a shorter source leaves the tail as it
    /// was. Returns the number of bytes taken from `bytes`.
    pub fn overlay_binary(&mut self, bytes: &[u8]) -> usize {
        let taken = bytes.len().min(KEYMAP_BYTES);
        let mut merged = self.to_binary();
        merged[..taken].copy_from_slice(&bytes[..taken]);
        for (code, chunk) in self.keys.iter_mut().zip(merged.chunks_exact(KEYCODE_SIZE)) {
            *code = Keycode::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        taken
    }

    /// Diagnostic hex rendering: 16 bytes per line, lowercase pairs, an extra
    /// space between keycodes.
    pub fn to_hex_text(&self) -> String {
        let bytes = self.to_binary();
        let mut out = String::with_capacity(KEYMAP_BYTES * 3 + KEYMAP_BYTES / 4);
        for line in bytes.chunks(HEX_BYTES_PER_LINE) {
            for (i, byte) in line.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                    if i % KEYCODE_SIZE == 0 {
                        out.push(' ');
                    }
                }
                let _ = write!(out, "{byte:02x}");
            }
            out.push('\n');
        }
        out
    }

    /// Slots whose keycode differs from `other`
    pub fn diff(&self, other: &Keymap) -> Vec<Position> {
        Position::all()
            .filter(|&pos| self.get(pos) != other.get(pos))
            .collect()
    }
}

impl fmt::Debug for Keymap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assigned = self.keys.iter().filter(|k| **k != Keycode::DISABLED).count();
        f.debug_struct("Keymap")
            .field("assigned", &assigned)
            .finish_non_exhaustive()
    }
}
