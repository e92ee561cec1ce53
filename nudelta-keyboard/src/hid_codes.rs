//! HID usage names for keyboard and consumer pages

/// Keyboard page usages with their canonical names
#[rustfmt::skip]
const KEY_USAGES: &[(u8, &str)] = &[
    (0x04, "A"), (0x05, "B"), (0x06, "C"), (0x07, "D"),
    (0x08, "E"), (0x09, "F"), (0x0A, "G"), (0x0B, "H"),
    (0x0C, "I"), (0x0D, "J"), (0x0E, "K"), (0x0F, "L"),
    (0x10, "M"), (0x11, "N"), (0x12, "O"), (0x13, "P"),
    (0x14, "Q"), (0x15, "R"), (0x16, "S"), (0x17, "T"),
    (0x18, "U"), (0x19, "V"), (0x1A, "W"), (0x1B, "X"),
    (0x1C, "Y"), (0x1D, "Z"),
    (0x1E, "1"), (0x1F, "2"), (0x20, "3"), (0x21, "4"),
    (0x22, "5"), (0x23, "6"), (0x24, "7"), (0x25, "8"),
    (0x26, "9"), (0x27, "0"),
    (0x28, "Enter"), (0x29, "Escape"), (0x2A, "Backspace"),
    (0x2B, "Tab"), (0x2C, "Space"), (0x2D, "Minus"), (0x2E, "Equal"),
    (0x2F, "LeftBracket"), (0x30, "RightBracket"), (0x31, "Backslash"),
    (0x32, "NonUsHash"), (0x33, "Semicolon"), (0x34, "Quote"),
    (0x35, "Grave"), (0x36, "Comma"), (0x37, "Period"), (0x38, "Slash"),
    (0x39, "CapsLock"),
    (0x3A, "F1"), (0x3B, "F2"), (0x3C, "F3"), (0x3D, "F4"),
    (0x3E, "F5"), (0x3F, "F6"), (0x40, "F7"), (0x41, "F8"),
    (0x42, "F9"), (0x43, "F10"), (0x44, "F11"), (0x45, "F12"),
    (0x46, "PrintScreen"), (0x47, "ScrollLock"), (0x48, "Pause"),
    (0x49, "Insert"), (0x4A, "Home"), (0x4B, "PageUp"),
    (0x4C, "Delete"), (0x4D, "End"), (0x4E, "PageDown"),
    (0x4F, "Right"), (0x50, "Left"), (0x51, "Down"), (0x52, "Up"),
    (0x53, "NumLock"), (0x54, "KpSlash"), (0x55, "KpAsterisk"),
    (0x56, "KpMinus"), (0x57, "KpPlus"), (0x58, "KpEnter"),
    (0x59, "Kp1"), (0x5A, "Kp2"), (0x5B, "Kp3"), (0x5C, "Kp4"),
    (0x5D, "Kp5"), (0x5E, "Kp6"), (0x5F, "Kp7"), (0x60, "Kp8"),
    (0x61, "Kp9"), (0x62, "Kp0"), (0x63, "KpDot"),
    (0x64, "NonUsBackslash"), (0x65, "Application"), (0x66, "Power"),
    (0x67, "KpEqual"),
    (0x68, "F13"), (0x69, "F14"), (0x6A, "F15"), (0x6B, "F16"),
    (0x6C, "F17"), (0x6D, "F18"), (0x6E, "F19"), (0x6F, "F20"),
    (0x70, "F21"), (0x71, "F22"), (0x72, "F23"), (0x73, "F24"),
    (0xE0, "LCtrl"), (0xE1, "LShift"), (0xE2, "LAlt"), (0xE3, "LGui"),
    (0xE4, "RCtrl"), (0xE5, "RShift"), (0xE6, "RAlt"), (0xE7, "RGui"),
];

/// Extra spellings accepted when parsing (matched case-insensitively)
const KEY_ALIASES: &[(&str, u8)] = &[
    ("esc", 0x29),
    ("return", 0x28),
    ("ent", 0x28),
    ("bksp", 0x2A),
    ("spc", 0x2C),
    ("-", 0x2D),
    ("=", 0x2E),
    ("[", 0x2F),
    ("]", 0x30),
    ("\\", 0x31),
    (";", 0x33),
    ("'", 0x34),
    ("`", 0x35),
    ("backtick", 0x35),
    (",", 0x36),
    (".", 0x37),
    ("dot", 0x37),
    ("/", 0x38),
    ("caps", 0x39),
    ("prtsc", 0x46),
    ("ins", 0x49),
    ("del", 0x4C),
    ("pgup", 0x4B),
    ("pgdn", 0x4E),
    ("menu", 0x65),
    ("app", 0x65),
    ("lctl", 0xE0),
    ("lcontrol", 0xE0),
    ("lshf", 0xE1),
    ("loption", 0xE2),
    ("lopt", 0xE2),
    ("lwin", 0xE3),
    ("lcmd", 0xE3),
    ("lsuper", 0xE3),
    ("rctl", 0xE4),
    ("rcontrol", 0xE4),
    ("rshf", 0xE5),
    ("roption", 0xE6),
    ("ropt", 0xE6),
    ("altgr", 0xE6),
    ("rwin", 0xE7),
    ("rcmd", 0xE7),
    ("rsuper", 0xE7),
];

/// Consumer page usages with their canonical names
const CONSUMER_USAGES: &[(u16, &str)] = &[
    (0x006F, "BrightnessUp"),
    (0x0070, "BrightnessDown"),
    (0x00B5, "NextTrack"),
    (0x00B6, "PrevTrack"),
    (0x00B7, "Stop"),
    (0x00CD, "PlayPause"),
    (0x00E2, "Mute"),
    (0x00E9, "VolumeUp"),
    (0x00EA, "VolumeDown"),
    (0x018A, "Mail"),
    (0x0192, "Calculator"),
    (0x0194, "MyComputer"),
    (0x0221, "Search"),
    (0x0223, "BrowserHome"),
];

const CONSUMER_ALIASES: &[(&str, u16)] = &[
    ("volup", 0x00E9),
    ("voldown", 0x00EA),
    ("next", 0x00B5),
    ("prev", 0x00B6),
    ("play", 0x00CD),
    ("calc", 0x0192),
];

/// Canonical name of a keyboard page usage
pub fn key_name(usage: u8) -> Option<&'static str> {
    KEY_USAGES
        .iter()
        .find(|(code, _)| *code == usage)
        .map(|(_, name)| *name)
}

/// Keyboard usage for a canonical name or alias (case-insensitive)
pub fn key_code_from_name(name: &str) -> Option<u8> {
    KEY_USAGES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
        .or_else(|| {
            KEY_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                .map(|(_, code)| *code)
        })
}

/// Canonical name of a consumer page usage
pub fn consumer_name(usage: u16) -> Option<&'static str> {
    CONSUMER_USAGES
        .iter()
        .find(|(code, _)| *code == usage)
        .map(|(_, name)| *name)
}

/// Consumer usage for a canonical name or alias (case-insensitive)
pub fn consumer_code_from_name(name: &str) -> Option<u16> {
    CONSUMER_USAGES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
        .or_else(|| {
            CONSUMER_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                .map(|(_, code)| *code)
        })
}

/// True for the eight modifier usages (0xE0-0xE7)
pub fn is_modifier(usage: u8) -> bool {
    (0xE0..=0xE7).contains(&usage)
}
