//! Keymap command handlers.

use std::path::Path;

use super::{with_air60, CommandResult};
use nudelta::operations;
use nudelta::Settings;
use nudelta_keyboard::Mode;

/// Restore the factory keymap
pub fn reset(settings: &Settings, mode: Mode) -> CommandResult {
    with_air60(settings, |air60| {
        println!("{}", operations::reset(air60, mode)?);
        Ok(())
    })
}

/// Dump the keymap to a binary file and optionally a hex text file
pub fn dump(settings: &Settings, mode: Mode, path: &Path, hex: Option<&Path>) -> CommandResult {
    with_air60(settings, |air60| {
        println!("{}", operations::dump(air60, mode, path, hex)?);
        Ok(())
    })
}

/// Overlay a binary keymap file
pub fn load_keys(settings: &Settings, mode: Mode, path: &Path) -> CommandResult {
    with_air60(settings, |air60| {
        let report = operations::load_binary(air60, mode, path)?;
        println!("{report}");
        if report.consumed < nudelta_transport::protocol::keymap::KEYMAP_BYTES {
            println!(
                "Note: '{}' is only {} bytes long; the rest of the keymap was left as it was.",
                path.display(),
                report.consumed
            );
        }
        Ok(())
    })
}

/// Apply a YAML profile
pub fn load_profile(settings: &Settings, mode: Mode, path: &Path) -> CommandResult {
    with_air60(settings, |air60| {
        println!("{}", operations::load_profile(air60, mode, path)?);
        Ok(())
    })
}

/// Save the keymap as a YAML profile
pub fn export_profile(settings: &Settings, mode: Mode, path: &Path) -> CommandResult {
    with_air60(settings, |air60| {
        println!("{}", operations::export_profile(air60, mode, path)?);
        Ok(())
    })
}
