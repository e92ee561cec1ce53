//! Air60 physical layout on the 16×16 keymap matrix
//!
//! Slot index = row × 16 + col. Only 64 slots carry a physical key; the rest
//! exist in every keymap buffer and are addressed by coordinate (`R5C3`).
//! A physical key is named after the key its cap shows in Windows mode.

use std::fmt;
use std::str::FromStr;

use nudelta_transport::protocol::keymap::KEY_SLOTS;

use crate::action::Keycode;
use crate::error::KeyboardError;
use crate::hid_codes;

pub const MATRIX_ROWS: u8 = 16;
pub const MATRIX_COLS: u8 = 16;

const fn at(row: u8, col: u8) -> u8 {
    row * MATRIX_COLS + col
}

const fn key(usage: u8) -> Keycode {
    Keycode::key(usage)
}

/// Physical keys: matrix slot and the Windows-mode factory keycode
#[rustfmt::skip]
pub(crate) const AIR60_KEYS: &[(u8, Keycode)] = &[
    // Row 0
    (at(0, 0), key(0x29)), (at(0, 1), key(0x1E)), (at(0, 2), key(0x1F)),
    (at(0, 3), key(0x20)), (at(0, 4), key(0x21)), (at(0, 5), key(0x22)),
    (at(0, 6), key(0x23)), (at(0, 7), key(0x24)), (at(0, 8), key(0x25)),
    (at(0, 9), key(0x26)), (at(0, 10), key(0x27)), (at(0, 11), key(0x2D)),
    (at(0, 12), key(0x2E)), (at(0, 13), key(0x2A)),
    // Row 1
    (at(1, 0), key(0x2B)), (at(1, 1), key(0x14)), (at(1, 2), key(0x1A)),
    (at(1, 3), key(0x08)), (at(1, 4), key(0x15)), (at(1, 5), key(0x17)),
    (at(1, 6), key(0x1C)), (at(1, 7), key(0x18)), (at(1, 8), key(0x0C)),
    (at(1, 9), key(0x12)), (at(1, 10), key(0x13)), (at(1, 11), key(0x2F)),
    (at(1, 12), key(0x30)), (at(1, 13), key(0x31)),
    // Row 2
    (at(2, 0), key(0x39)), (at(2, 1), key(0x04)), (at(2, 2), key(0x16)),
    (at(2, 3), key(0x07)), (at(2, 4), key(0x09)), (at(2, 5), key(0x0A)),
    (at(2, 6), key(0x0B)), (at(2, 7), key(0x0D)), (at(2, 8), key(0x0E)),
    (at(2, 9), key(0x0F)), (at(2, 10), key(0x33)), (at(2, 11), key(0x34)),
    (at(2, 12), key(0x28)),
    // Row 3
    (at(3, 0), key(0xE1)), (at(3, 1), key(0x1D)), (at(3, 2), key(0x1B)),
    (at(3, 3), key(0x06)), (at(3, 4), key(0x19)), (at(3, 5), key(0x05)),
    (at(3, 6), key(0x11)), (at(3, 7), key(0x10)), (at(3, 8), key(0x36)),
    (at(3, 9), key(0x37)), (at(3, 10), key(0x38)), (at(3, 11), key(0xE5)),
    (at(3, 12), key(0x52)), (at(3, 13), key(0x4C)),
    // Row 4
    (at(4, 0), key(0xE0)), (at(4, 1), key(0xE3)), (at(4, 2), key(0xE2)),
    (at(4, 5), key(0x2C)), (at(4, 9), key(0xE6)), (at(4, 10), Keycode::FN),
    (at(4, 11), key(0x50)), (at(4, 12), key(0x51)), (at(4, 13), key(0x4F)),
];

/// Slots whose Mac-mode factory keycode differs: Option sits next to
/// Control and the right Alt cap becomes Command.
pub(crate) const MAC_OVERRIDES: &[(u8, Keycode)] = &[
    (at(4, 1), key(0xE2)),
    (at(4, 2), key(0xE3)),
    (at(4, 9), key(0xE7)),
];

/// One of the 256 keymap slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(u8);

impl Position {
    pub const fn new(index: u8) -> Self {
        Position(index)
    }

    pub const fn at(row: u8, col: u8) -> Option<Self> {
        if row < MATRIX_ROWS && col < MATRIX_COLS {
            Some(Position(at(row, col)))
        } else {
            None
        }
    }

    /// Every slot in buffer order
    pub fn all() -> impl Iterator<Item = Position> {
        (0..KEY_SLOTS).map(|i| Position(i as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> u8 {
        self.0 / MATRIX_COLS
    }

    pub fn col(self) -> u8 {
        self.0 % MATRIX_COLS
    }

    /// Name of the physical key at this slot, `None` for empty slots
    pub fn name(self) -> Option<&'static str> {
        let (_, code) = AIR60_KEYS.iter().find(|(index, _)| *index == self.0)?;
        if *code == Keycode::FN {
            return Some("Fn");
        }
        hid_codes::key_name(code.to_bytes()[2])
    }

    /// Whether a physical key sits at this slot
    pub fn is_physical(self) -> bool {
        self.name().is_some()
    }

    /// Look up a physical key by name, alias, or any spelling of its
    /// Windows-mode keycode (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("fn") {
            return physical_slot_of(Keycode::FN);
        }
        let usage = hid_codes::key_code_from_name(name)?;
        physical_slot_of(Keycode::key(usage))
    }

    fn from_coordinate(s: &str) -> Option<Self> {
        let rest = s.strip_prefix(['R', 'r'])?;
        let (row, col) = rest.split_once(['C', 'c'])?;
        Position::at(row.parse().ok()?, col.parse().ok()?)
    }
}

fn physical_slot_of(code: Keycode) -> Option<Position> {
    AIR60_KEYS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(index, _)| Position(*index))
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "R{}C{}", self.row(), self.col()),
        }
    }
}

impl FromStr for Position {
    type Err = KeyboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Position::from_name(s)
            .or_else(|| Position::from_coordinate(s))
            .ok_or_else(|| KeyboardError::UnknownPosition(s.to_string()))
    }
}
