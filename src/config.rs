//! Tool settings (TOML)
//!
//! ```toml
//! default_mode = "mac"
//!
//! [transport]
//! retries = 3
//! retry_delay_ms = 20
//! command_delay_ms = 5
//! operation_timeout_ms = 10000
//! ```
//!
//! Every key is optional. The file itself is optional too unless it was
//! named explicitly with `--config`.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use nudelta_keyboard::Mode;
use nudelta_transport::Timing;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "NUDELTA_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Keymap slot used when `--mac` is not given
    #[serde(
        serialize_with = "serialize_mode",
        deserialize_with = "deserialize_mode"
    )]
    pub default_mode: Mode,

    pub transport: TransportSettings,
}

/// Retry and pacing policy for the HID session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSettings {
    pub retries: usize,
    pub retry_delay_ms: u64,
    pub command_delay_ms: u64,
    pub operation_timeout_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Timing::default().into()
    }
}

impl From<Timing> for TransportSettings {
    fn from(t: Timing) -> Self {
        Self {
            retries: t.retries,
            retry_delay_ms: t.retry_delay_ms,
            command_delay_ms: t.command_delay_ms,
            operation_timeout_ms: t.operation_timeout_ms,
        }
    }
}

impl From<TransportSettings> for Timing {
    fn from(t: TransportSettings) -> Self {
        Timing {
            retries: t.retries,
            retry_delay_ms: t.retry_delay_ms,
            command_delay_ms: t.command_delay_ms,
            operation_timeout_ms: t.operation_timeout_ms,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_mode: Mode::Windows,
            transport: TransportSettings::default(),
        }
    }
}

fn serialize_mode<S: Serializer>(mode: &Mode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&mode.name().to_ascii_lowercase())
}

fn deserialize_mode<'de, D: Deserializer<'de>>(d: D) -> Result<Mode, D::Error> {
    let s = String::deserialize(d)?;
    s.parse().map_err(serde::de::Error::custom)
}

impl Settings {
    /// `<config dir>/nudelta/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nudelta").join("config.toml"))
    }

    /// Load the settings the way the command line does: an explicit path
    /// must exist; otherwise `$NUDELTA_CONFIG` or the default path is read
    /// when present.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let implicit = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);
        match implicit {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a file, or return defaults if it does not exist
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open '{}' for reading", path.display()))?;
        let settings = Self::parse(&content)
            .with_context(|| format!("Invalid settings file '{}'", path.display()))?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.transport.retries >= 1,
            "transport.retries must be at least 1"
        );
        ensure!(
            self.transport.operation_timeout_ms > 0,
            "transport.operation_timeout_ms must be greater than 0"
        );
        Ok(())
    }

    /// Mode to operate on; `--mac` always wins
    pub fn mode(&self, mac: bool) -> Mode {
        if mac {
            Mode::Mac
        } else {
            self.default_mode
        }
    }

    pub fn timing(&self) -> Timing {
        self.transport.into()
    }
}
