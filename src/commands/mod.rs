//! Command handlers for the CLI application.
//!
//! - `query`: version and firmware
//! - `keymap`: reset, dump, load and export of keymaps

pub mod keymap;
pub mod query;

use nudelta::{operations, Settings};
use nudelta_keyboard::Air60;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Open the keyboard, announce it and run a closure with it.
pub fn with_air60<F>(settings: &Settings, f: F) -> CommandResult
where
    F: FnOnce(&Air60) -> CommandResult,
{
    operations::with_connection(
        || Air60::find(settings.timing()),
        |air60| {
            println!(
                "Found NuPhy Air60 at path {} (Firmware {})",
                air60.path(),
                air60.firmware()
            );
            f(air60)
        },
    )
}
