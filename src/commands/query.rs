//! Query command handlers.

use super::{with_air60, CommandResult};
use nudelta::Settings;

/// Print version and licence
pub fn version() -> CommandResult {
    println!("Nudelta Utility v{}", env!("CARGO_PKG_VERSION"));
    println!("Copyright (c) Mohamed Gaber 2022");
    println!(
        "
Licensed under the GNU General Public License, version 3, or at your option,
any later version.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>."
    );
    Ok(())
}

/// Print the firmware version; the banner from opening the keyboard is all
/// there is to show.
pub fn firmware(settings: &Settings) -> CommandResult {
    with_air60(settings, |_| Ok(()))
}
