// CLI definitions using clap

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nudelta")]
#[command(about = "Keymap configuration utility for the NuPhy Air60")]
#[command(disable_version_flag = true)]
#[command(group(
    ArgGroup::new("operation")
        .args(["version", "firmware", "reset_keys", "dump_keys", "load_keys", "load_profile", "export_profile"])
))]
pub struct Cli {
    /// Show the current version of this app and exit.
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Print the Air60 keyboard's firmware and exit.
    #[arg(short, long)]
    pub firmware: bool,

    /// Perform operations on the Mac mode of the keyboard instead of the windows one.
    #[arg(short = 'M', long)]
    pub mac: bool,

    /// Restore the factory keymap.
    #[arg(short, long)]
    pub reset_keys: bool,

    /// Dump the keymap to a binary file.
    #[arg(short = 'D', long, value_name = "FILE")]
    pub dump_keys: Option<PathBuf>,

    /// When the keymap is dumped to a binary file, also dump the keymap in a hex format to a text file.
    #[arg(short = 'H', long, value_name = "FILE", requires = "dump_keys")]
    pub dump_hex_to: Option<PathBuf>,

    /// Load the keymap from a binary file.
    #[arg(short = 'L', long, value_name = "FILE")]
    pub load_keys: Option<PathBuf>,

    /// Load YAML keymap
    #[arg(short = 'l', long, value_name = "FILE")]
    pub load_profile: Option<PathBuf>,

    /// Save the current keymap as a YAML profile.
    #[arg(short = 'E', long, value_name = "FILE")]
    pub export_profile: Option<PathBuf>,

    /// Settings file (default: $NUDELTA_CONFIG or <config dir>/nudelta/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log protocol traffic to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The one operation requested, if any
    pub fn operation(&self) -> Option<Command> {
        if self.version {
            return Some(Command::Version);
        }
        if self.firmware {
            return Some(Command::Firmware);
        }
        if self.reset_keys {
            return Some(Command::Reset);
        }
        if let Some(path) = &self.dump_keys {
            return Some(Command::Dump {
                path: path.clone(),
                hex: self.dump_hex_to.clone(),
            });
        }
        if let Some(path) = &self.load_keys {
            return Some(Command::LoadKeys(path.clone()));
        }
        if let Some(path) = &self.load_profile {
            return Some(Command::LoadProfile(path.clone()));
        }
        self.export_profile.clone().map(Command::ExportProfile)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Version,
    Firmware,
    Reset,
    Dump { path: PathBuf, hex: Option<PathBuf> },
    LoadKeys(PathBuf),
    LoadProfile(PathBuf),
    ExportProfile(PathBuf),
}

impl Command {
    /// Whether the command talks to the keyboard
    pub fn needs_device(&self) -> bool {
        !matches!(self, Command::Version)
    }
}
