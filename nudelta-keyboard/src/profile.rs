//! Structured keymap profiles (YAML)
//!
//! ```yaml
//! keys:
//!   CapsLock: LCtrl
//!   Esc: Grave
//!   R5C3: Disabled
//! ```
//!
//! A profile is an overlay: positions it does not mention keep whatever the
//! keymap held before. It is fully resolved before any slot is touched, so
//! one bad entry rejects the whole file.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::action::{Action, Keycode};
use crate::error::KeyboardError;
use crate::keymap::Keymap;
use crate::layout::Position;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileDocument {
    #[serde(default)]
    keys: Mapping,
}

/// Ordered position → action entries, as written in the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    entries: Vec<(String, String)>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; later entries for the same position win.
    pub fn insert(&mut self, position: impl Into<String>, action: impl Into<String>) {
        self.entries.push((position.into(), action.into()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_yaml(text: &str) -> Result<Self, KeyboardError> {
        let doc: Option<ProfileDocument> = serde_yaml::from_str(text)?;
        let doc = doc.unwrap_or_default();

        let mut profile = Profile::new();
        for (key, value) in doc.keys {
            let position = scalar_text(&key)
                .ok_or_else(|| KeyboardError::Profile(format!("position {key:?} is not a scalar")))?;
            let action = scalar_text(&value).ok_or_else(|| {
                KeyboardError::Profile(format!("action for {position} is not a scalar"))
            })?;
            profile.insert(position, action);
        }
        Ok(profile)
    }

    pub fn to_yaml(&self) -> Result<String, KeyboardError> {
        let keys = self
            .entries
            .iter()
            .map(|(pos, action)| (Value::String(pos.clone()), Value::String(action.clone())))
            .collect();
        Ok(serde_yaml::to_string(&ProfileDocument { keys })?)
    }

    /// Name every slot of `keymap`.
    ///
    /// Fails with `UnknownKeycode` on the first slot whose value has no
    /// symbolic name; such a keymap can only be saved as binary.
    pub fn from_keymap(keymap: &Keymap) -> Result<Self, KeyboardError> {
        let mut profile = Profile::new();
        for pos in Position::all() {
            let code = keymap.get(pos);
            let action = code.action().ok_or_else(|| KeyboardError::UnknownKeycode {
                position: pos.to_string(),
                value: code.0,
            })?;
            profile.insert(pos.to_string(), action.to_string());
        }
        Ok(profile)
    }

    /// Validate every entry against the layout and keycode tables.
    pub fn resolve(&self) -> Result<Vec<(Position, Keycode)>, KeyboardError> {
        self.entries
            .iter()
            .map(|(pos, action)| {
                let pos: Position = pos.parse()?;
                let action: Action = action.parse()?;
                Ok((pos, action.to_keycode()))
            })
            .collect()
    }

    /// Overlay this profile on `keymap`, returning the new keymap.
    pub fn apply(&self, keymap: &Keymap) -> Result<Keymap, KeyboardError> {
        let resolved = self.resolve()?;
        let mut out = keymap.clone();
        for (pos, code) in resolved {
            out.set(pos, code);
        }
        Ok(out)
    }
}

/// Text of a scalar YAML node; numbers and booleans keep their spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{MAC_DEFAULT, WINDOWS_DEFAULT};

    #[test]
    fn parse_mapping() {
        let profile = Profile::from_yaml("keys:\n  CapsLock: LCtrl\n  Esc: Grave\n  1: 2\n").unwrap();
        assert_eq!(
            profile.entries(),
            &[
                ("CapsLock".to_string(), "LCtrl".to_string()),
                ("Esc".to_string(), "Grave".to_string()),
                ("1".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn empty_documents() {
        assert!(Profile::from_yaml("").unwrap().is_empty());
        assert!(Profile::from_yaml("keys: {}\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_documents() {
        assert!(matches!(
            Profile::from_yaml("keys: [A, B]"),
            Err(KeyboardError::Profile(_))
        ));
        assert!(matches!(
            Profile::from_yaml("keys:\n  A: [B]\n"),
            Err(KeyboardError::Profile(_))
        ));
        assert!(matches!(
            Profile::from_yaml("keys: {A: B"),
            Err(KeyboardError::Profile(_))
        ));
    }

    #[test]
    fn mappings_outside_keys_are_rejected() {
        // A flat mapping or a misspelt section must not parse as an empty profile
        for text in ["A: B\n", "key:\n  A: B\n", "keys:\n  A: B\nlayers: {}\n"] {
            assert!(
                matches!(Profile::from_yaml(text), Err(KeyboardError::Profile(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn overlay_touches_only_named_positions() {
        let mut profile = Profile::new();
        profile.insert("A", "B");
        let out = profile.apply(&WINDOWS_DEFAULT).unwrap();

        let a: Position = "A".parse().unwrap();
        assert_eq!(WINDOWS_DEFAULT.diff(&out), vec![a]);
        assert_eq!(out.get(a).action(), Some(Action::Key(0x05)));
    }

    #[test]
    fn invalid_entry_rejects_whole_profile() {
        let mut profile = Profile::new();
        profile.insert("A", "B");
        profile.insert("CapsLock", "Hyper");
        assert!(matches!(
            profile.apply(&WINDOWS_DEFAULT),
            Err(KeyboardError::UnknownAction(name)) if name == "Hyper"
        ));

        let mut profile = Profile::new();
        profile.insert("Numpad7", "B");
        assert!(matches!(
            profile.apply(&WINDOWS_DEFAULT),
            Err(KeyboardError::UnknownPosition(_))
        ));
    }

    #[test]
    fn structured_roundtrip() {
        for keymap in [WINDOWS_DEFAULT, MAC_DEFAULT] {
            let profile = Profile::from_keymap(&keymap).unwrap();
            assert_eq!(profile.len(), 256);
            let text = profile.to_yaml().unwrap();
            let reparsed = Profile::from_yaml(&text).unwrap();
            assert_eq!(reparsed.apply(&Keymap::default()).unwrap(), keymap);
        }
    }

    #[test]
    fn unnamed_keycode_is_not_exported() {
        let mut keymap = WINDOWS_DEFAULT;
        keymap.set(Position::new(83), Keycode(0xDEAD_BEEF));
        match Profile::from_keymap(&keymap) {
            Err(KeyboardError::UnknownKeycode { position, value }) => {
                assert_eq!(position, "R5C3");
                assert_eq!(value, 0xDEAD_BEEF);
            }
            other => panic!("expected UnknownKeycode, got {other:?}"),
        }
    }
}
