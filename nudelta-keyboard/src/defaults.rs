//! Factory-default keymaps, built at compile time from the layout table

use nudelta_transport::protocol::keymap::KEY_SLOTS;
use nudelta_transport::Mode;

use crate::action::Keycode;
use crate::keymap::Keymap;
use crate::layout::{AIR60_KEYS, MAC_OVERRIDES};

const fn build(mac: bool) -> Keymap {
    let mut keys = [Keycode::DISABLED; KEY_SLOTS];

    let mut i = 0;
    while i < AIR60_KEYS.len() {
        let (index, code) = AIR60_KEYS[i];
        keys[index as usize] = code;
        i += 1;
    }

    if mac {
        let mut i = 0;
        while i < MAC_OVERRIDES.len() {
            let (index, code) = MAC_OVERRIDES[i];
            keys[index as usize] = code;
            i += 1;
        }
    }

    Keymap::from_keycodes(keys)
}

pub const WINDOWS_DEFAULT: Keymap = build(false);
pub const MAC_DEFAULT: Keymap = build(true);

/// Keymap the Air60 ships with for `mode`
pub fn factory_default(mode: Mode) -> Keymap {
    match mode {
        Mode::Windows => WINDOWS_DEFAULT,
        Mode::Mac => MAC_DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::layout::Position;

    #[test]
    fn modes_differ_only_in_modifier_row() {
        let changed = WINDOWS_DEFAULT.diff(&MAC_DEFAULT);
        let names: Vec<String> = changed.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, ["LGui", "LAlt", "RAlt"]);
    }

    #[test]
    fn physical_keys_type_their_legend_in_windows_mode() {
        for pos in Position::all().filter(|p| p.is_physical()) {
            let action = WINDOWS_DEFAULT.get(pos).action().unwrap();
            assert_eq!(action.to_string(), pos.to_string());
        }
    }

    #[test]
    fn empty_slots_are_disabled() {
        let assigned = WINDOWS_DEFAULT
            .keycodes()
            .iter()
            .filter(|k| **k != Keycode::DISABLED)
            .count();
        assert_eq!(assigned, 64);
        assert_eq!(
            MAC_DEFAULT.get("LGui".parse().unwrap()).action(),
            Some(Action::Key(0xE2))
        );
    }
}
