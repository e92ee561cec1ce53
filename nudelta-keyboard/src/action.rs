//! Keycodes and the symbolic actions they encode.
//!
//! A [`Keycode`] is the raw 32-bit slot value stored on the device, always
//! little-endian on the wire. Read as bytes it is `[kind, b1, b2, b3]`:
//!
//! ```text
//! [0, 0,    usage, 0]    plain key (modifiers included, 0xE0-0xE7)
//! [0, mods, usage, 0]    modifier combo, HID modifier bitmask in b1
//! [3, 0,    lo,    hi]   consumer/media usage
//! [9, 0,    slot,  0]    macro slot
//! [10, 1,   0,     0]    Fn layer shift
//! [0, 0,    0,     0]    disabled
//! ```
//!
//! Any other value is legal on the device and survives binary dumps, but has
//! no [`Action`] and therefore no name in a structured profile.
//!
//! # Parsing syntax
//!
//! ```text
//! A            → Key(0x04)
//! Esc          → Key(0x29)       (alias)
//! LShift       → Key(0xE1)
//! Ctrl+C       → Combo(LCtrl, C)
//! VolumeUp     → Consumer(0x00E9)
//! Macro(3)     → Macro(3)
//! Fn           → Fn
//! Disabled     → Disabled
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::KeyboardError;
use crate::hid_codes;

/// HID modifier bitmask constants (byte 1 of a combo keycode)
pub mod mods {
    pub const LCTRL: u8 = 0x01;
    pub const LSHIFT: u8 = 0x02;
    pub const LALT: u8 = 0x04;
    pub const LGUI: u8 = 0x08;
    pub const RCTRL: u8 = 0x10;
    pub const RSHIFT: u8 = 0x20;
    pub const RALT: u8 = 0x40;
    pub const RGUI: u8 = 0x80;
}

/// Keycode kind byte
mod kind {
    pub const KEY: u8 = 0;
    pub const CONSUMER: u8 = 3;
    pub const MACRO: u8 = 9;
    pub const SPECIAL: u8 = 10;
}

/// Sub-function of a `SPECIAL` keycode that shifts to the Fn layer
const SPECIAL_FN: u8 = 1;

const MODIFIER_NAMES: &[(u8, &str)] = &[
    (mods::LCTRL, "Ctrl"),
    (mods::LSHIFT, "Shift"),
    (mods::LALT, "Alt"),
    (mods::LGUI, "Gui"),
    (mods::RCTRL, "RCtrl"),
    (mods::RSHIFT, "RShift"),
    (mods::RALT, "RAlt"),
    (mods::RGUI, "RGui"),
];

// ---------------------------------------------------------------------------
// Keycode
// ---------------------------------------------------------------------------

/// Raw 32-bit keycode as stored in one keymap slot
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Keycode(pub u32);

impl Keycode {
    pub const DISABLED: Keycode = Keycode(0);
    pub const FN: Keycode = Keycode::from_bytes([kind::SPECIAL, SPECIAL_FN, 0, 0]);

    /// Plain key for a keyboard page usage
    pub const fn key(usage: u8) -> Self {
        Self::from_bytes([kind::KEY, 0, usage, 0])
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Keycode(u32::from_le_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// The named action for this value, if the keycode table has one
    pub fn action(self) -> Option<Action> {
        Action::from_keycode(self)
    }
}

impl fmt::Debug for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action() {
            Some(action) => write!(f, "Keycode(0x{:08X} {action})", self.0),
            None => write!(f, "Keycode(0x{:08X})", self.0),
        }
    }
}

impl From<Action> for Keycode {
    fn from(action: Action) -> Self {
        action.to_keycode()
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What a key does when pressed; every variant has a symbolic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Disabled,
    /// Keyboard page usage, modifiers included
    Key(u8),
    /// Modifier bitmask from [`mods`] plus a key
    Combo { mods: u8, key: u8 },
    /// Consumer page usage
    Consumer(u16),
    /// Macro slot
    Macro(u8),
    /// Fn layer shift
    Fn,
}

impl Action {
    pub fn to_keycode(self) -> Keycode {
        let bytes = match self {
            Action::Disabled => [0, 0, 0, 0],
            Action::Key(usage) => [kind::KEY, 0, usage, 0],
            Action::Combo { mods, key } => [kind::KEY, mods, key, 0],
            Action::Consumer(code) => [kind::CONSUMER, 0, code as u8, (code >> 8) as u8],
            Action::Macro(slot) => [kind::MACRO, 0, slot, 0],
            Action::Fn => [kind::SPECIAL, SPECIAL_FN, 0, 0],
        };
        Keycode::from_bytes(bytes)
    }

    /// Decode a keycode; `None` when the value has no name.
    pub fn from_keycode(code: Keycode) -> Option<Self> {
        match code.to_bytes() {
            [0, 0, 0, 0] => Some(Action::Disabled),
            [kind::KEY, 0, usage, 0] => hid_codes::key_name(usage).map(|_| Action::Key(usage)),
            [kind::KEY, mods, key, 0] if !hid_codes::is_modifier(key) => {
                hid_codes::key_name(key).map(|_| Action::Combo { mods, key })
            }
            [kind::CONSUMER, 0, lo, hi] => {
                let usage = u16::from_le_bytes([lo, hi]);
                hid_codes::consumer_name(usage).map(|_| Action::Consumer(usage))
            }
            [kind::MACRO, 0, slot, 0] => Some(Action::Macro(slot)),
            [kind::SPECIAL, SPECIAL_FN, 0, 0] => Some(Action::Fn),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Disabled => write!(f, "Disabled"),
            Action::Key(usage) => match hid_codes::key_name(*usage) {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "Key(0x{usage:02X})"),
            },
            Action::Combo { mods, key } => {
                for &(bit, name) in MODIFIER_NAMES {
                    if mods & bit != 0 {
                        write!(f, "{name}+")?;
                    }
                }
                match hid_codes::key_name(*key) {
                    Some(name) => write!(f, "{name}"),
                    None => write!(f, "Key(0x{key:02X})"),
                }
            }
            Action::Consumer(usage) => match hid_codes::consumer_name(*usage) {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "Consumer(0x{usage:04X})"),
            },
            Action::Macro(slot) => write!(f, "Macro({slot})"),
            Action::Fn => write!(f, "Fn"),
        }
    }
}

/// Parse a modifier name to its bitmask value.
pub fn parse_modifier(name: &str) -> Option<u8> {
    match name.to_ascii_lowercase().as_str() {
        "ctrl" | "control" | "lctrl" => Some(mods::LCTRL),
        "shift" | "lshift" => Some(mods::LSHIFT),
        "alt" | "lalt" | "option" | "opt" => Some(mods::LALT),
        "gui" | "win" | "cmd" | "super" | "lgui" => Some(mods::LGUI),
        "rctrl" => Some(mods::RCTRL),
        "rshift" => Some(mods::RSHIFT),
        "ralt" | "altgr" => Some(mods::RALT),
        "rgui" | "rwin" | "rcmd" => Some(mods::RGUI),
        _ => None,
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

impl FromStr for Action {
    type Err = KeyboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || KeyboardError::UnknownAction(s.to_string());

        match s.to_ascii_lowercase().as_str() {
            "disabled" | "none" | "off" => return Ok(Action::Disabled),
            "fn" => return Ok(Action::Fn),
            _ => {}
        }

        // Macro slot: "Macro(3)"
        if let Some(rest) = strip_prefix_ignore_case(s, "macro") {
            let slot = rest
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|inner| inner.trim().parse::<u8>().ok())
                .ok_or_else(unknown)?;
            return Ok(Action::Macro(slot));
        }

        // Modifier+Key combo: "Ctrl+C", "Shift+Alt+F3"
        if s.len() > 1 && s.contains('+') {
            let (mod_part, key_part) = s.rsplit_once('+').ok_or_else(unknown)?;
            let mut mod_bits = 0u8;
            for part in mod_part.split('+') {
                mod_bits |= parse_modifier(part.trim()).ok_or_else(unknown)?;
            }
            let key = hid_codes::key_code_from_name(key_part.trim())
                .filter(|k| !hid_codes::is_modifier(*k))
                .ok_or_else(unknown)?;
            return Ok(Action::Combo {
                mods: mod_bits,
                key,
            });
        }

        if let Some(usage) = hid_codes::key_code_from_name(s) {
            return Ok(Action::Key(usage));
        }
        if let Some(usage) = hid_codes::consumer_code_from_name(s) {
            return Ok(Action::Consumer(usage));
        }
        Err(unknown())
    }
}
