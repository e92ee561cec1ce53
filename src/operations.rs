//! File-backed keymap operations
//!
//! Each function drives one logical operation against an opened [`Air60`]
//! and returns a report describing what happened. Printing is left to the
//! caller.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use nudelta_keyboard::{Air60, FirmwareVersion, KeyboardError, Mode, Profile};
use nudelta_transport::protocol::keymap::KEYMAP_BYTES;
use nudelta_transport::Transport;
use tracing::{debug, info};

/// Result of a reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub mode: Mode,
}

impl fmt::Display for ResetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wrote default keymap config to keyboard.")
    }
}

/// Result of a dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpReport {
    pub mode: Mode,
    pub path: PathBuf,
    pub bytes: usize,
    pub hex_path: Option<PathBuf>,
}

impl fmt::Display for DumpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote current {} keymap to '{}'.",
            self.mode,
            self.path.display()
        )?;
        if let Some(hex) = &self.hex_path {
            write!(
                f,
                "\nWrote current keymap in hex format to '{}'.",
                hex.display()
            )?;
        }
        Ok(())
    }
}

/// Result of loading a binary keymap or a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub mode: Mode,
    pub path: PathBuf,
    /// Bytes taken from a binary file, entries taken from a profile
    pub consumed: usize,
    /// Keymap slots whose value changed
    pub changed: usize,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote keymap '{}' to the keyboard's {} mode.",
            self.path.display(),
            self.mode
        )
    }
}

/// Result of exporting a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub mode: Mode,
    pub path: PathBuf,
    pub entries: usize,
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote current {} keymap as a profile to '{}'.",
            self.mode,
            self.path.display()
        )
    }
}

/// Connect to the keyboard, then run `op` against it.
///
/// `op` never runs when `connect` fails, so no output file is created.
pub fn with_connection<T, C, F, R>(connect: C, op: F) -> anyhow::Result<R>
where
    T: Transport,
    C: FnOnce() -> Result<Air60<T>, KeyboardError>,
    F: FnOnce(&Air60<T>) -> anyhow::Result<R>,
{
    let air60 = connect()?;
    op(&air60)
}

/// Query the firmware version. Never writes to the keyboard.
pub fn firmware<T: Transport>(air60: &Air60<T>) -> anyhow::Result<FirmwareVersion> {
    Ok(air60.read_firmware()?)
}

/// Restore the factory keymap for `mode`
pub fn reset<T: Transport>(air60: &Air60<T>, mode: Mode) -> anyhow::Result<ResetReport> {
    air60.reset_keymap(mode)?;
    info!("Reset {} keymap", mode);
    Ok(ResetReport { mode })
}

/// Save the keymap for `mode` to `path` (always 1024 bytes), and optionally
/// a hex rendering of the same bytes to `hex_path`.
pub fn dump<T: Transport>(
    air60: &Air60<T>,
    mode: Mode,
    path: &Path,
    hex_path: Option<&Path>,
) -> anyhow::Result<DumpReport> {
    let keymap = air60.get_keymap(mode)?;
    let bytes = keymap.to_binary();
    write_file(path, &bytes)?;

    if let Some(hex) = hex_path {
        write_file(hex, keymap.to_hex_text().as_bytes())?;
    }

    info!("Dumped {} keymap to {}", mode, path.display());
    Ok(DumpReport {
        mode,
        path: path.to_path_buf(),
        bytes: bytes.len(),
        hex_path: hex_path.map(Path::to_path_buf),
    })
}

/// Overlay a binary keymap file onto the keymap for `mode`.
///
/// At most the first 1024 bytes are used. A shorter file replaces only the
/// bytes it covers; the rest keeps what the keyboard already holds.
pub fn load_binary<T: Transport>(
    air60: &Air60<T>,
    mode: Mode,
    path: &Path,
) -> anyhow::Result<LoadReport> {
    let data = read_keymap_file(path)?;
    let current = air60.get_keymap(mode)?;

    let mut keymap = current.clone();
    let consumed = keymap.overlay_binary(&data);
    if consumed < KEYMAP_BYTES {
        debug!(
            "{} holds {} bytes, keeping the last {} from the keyboard",
            path.display(),
            consumed,
            KEYMAP_BYTES - consumed
        );
    }
    air60.set_keymap(mode, &keymap)?;

    Ok(LoadReport {
        mode,
        path: path.to_path_buf(),
        consumed,
        changed: current.diff(&keymap).len(),
    })
}

/// Apply a YAML profile on top of the keymap for `mode`.
///
/// The profile is parsed and validated before the keyboard is touched, so
/// an invalid file leaves the device unchanged.
pub fn load_profile<T: Transport>(
    air60: &Air60<T>,
    mode: Mode,
    path: &Path,
) -> anyhow::Result<LoadReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open '{}' for reading", path.display()))?;
    let profile = Profile::from_yaml(&text)
        .with_context(|| format!("Invalid profile '{}'", path.display()))?;
    profile
        .resolve()
        .with_context(|| format!("Invalid profile '{}'", path.display()))?;

    let current = air60.get_keymap(mode)?;
    let keymap = profile.apply(&current)?;
    air60.set_keymap(mode, &keymap)?;

    Ok(LoadReport {
        mode,
        path: path.to_path_buf(),
        consumed: profile.len(),
        changed: current.diff(&keymap).len(),
    })
}

/// Save the keymap for `mode` as a YAML profile that [`load_profile`] reads
/// back. Fails without writing when a slot holds a keycode with no name.
pub fn export_profile<T: Transport>(
    air60: &Air60<T>,
    mode: Mode,
    path: &Path,
) -> anyhow::Result<ExportReport> {
    let keymap = air60.get_keymap(mode)?;
    let profile = Profile::from_keymap(&keymap)
        .context("Keymap cannot be expressed as a profile, dump it as binary instead")?;
    write_file(path, profile.to_yaml()?.as_bytes())?;

    Ok(ExportReport {
        mode,
        path: path.to_path_buf(),
        entries: profile.len(),
    })
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to open '{}' for writing", path.display()))
}

/// Read at most one keymap worth of bytes
fn read_keymap_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open '{}' for reading", path.display()))?;
    let mut data = Vec::with_capacity(KEYMAP_BYTES);
    file.take(KEYMAP_BYTES as u64)
        .read_to_end(&mut data)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_report_mentions_hex_sidecar() {
        let report = DumpReport {
            mode: Mode::Mac,
            path: "out.bin".into(),
            bytes: KEYMAP_BYTES,
            hex_path: Some("out.txt".into()),
        };
        assert_eq!(
            report.to_string(),
            "Wrote current Mac keymap to 'out.bin'.\n\
             Wrote current keymap in hex format to 'out.txt'."
        );
    }

    #[test]
    fn load_report_text() {
        let report = LoadReport {
            mode: Mode::Windows,
            path: "keys.yml".into(),
            consumed: 1,
            changed: 1,
        };
        assert_eq!(
            report.to_string(),
            "Wrote keymap 'keys.yml' to the keyboard's Windows mode."
        );
    }

    #[test]
    fn keymap_file_read_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0xAB; 4000]).unwrap();
        assert_eq!(read_keymap_file(&path).unwrap().len(), KEYMAP_BYTES);
    }
}
