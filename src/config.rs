//! Configuration file support for the CICS listener.
//!
//! Loads settings from `~/.config/cics-listener/config.toml` on Linux
//! (or platform-appropriate location on other OSes). The station
//! directory is seeded from here: callsign/id pairs for the remote
//! stations whose GPS reports should be tracked.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Default serial device for the console.
pub const DEFAULT_DEVICE: &str = "/dev/ttyS0";

/// Default baud rate of the NGT's RS-232 console.
pub const DEFAULT_BAUD: u32 = 9600;

/// A known remote station seeded into the directory at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct StationEntry {
    /// Callsign, used as the directory key (case-sensitive).
    pub callsign: String,

    /// The device's numeric id for this station.
    pub id: u32,
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial device the console is attached to.
    pub device: String,

    /// Serial baud rate.
    pub baud: u32,

    /// Bounded wait for one console line, in seconds.
    pub read_timeout: u64,

    /// Poll the device state every N seconds (0 disables).
    pub poll_interval: u64,

    /// Print the status snapshot every N seconds (0 disables).
    pub status_interval: u64,

    /// Known stations to seed the directory with.
    pub stations: Vec<StationEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            read_timeout: 1,
            poll_interval: 30,
            status_interval: 60,
            stations: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Invalid TOML in config file: {}", path.display()))
            }
            _ => Ok(Config::default()),
        }
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cics-listener/config.toml"))
    }

    /// Validate all configuration settings.
    pub fn validate(&self) -> Result<()> {
        if self.baud == 0 {
            anyhow::bail!("baud rate must be non-zero");
        }
        if self.read_timeout == 0 {
            anyhow::bail!("read_timeout must be non-zero");
        }

        let mut seen = HashSet::new();
        for station in &self.stations {
            if station.callsign.is_empty() {
                anyhow::bail!("station callsign must not be empty");
            }
            if !seen.insert(station.callsign.as_str()) {
                anyhow::bail!("duplicate station callsign: {}", station.callsign);
            }
        }
        Ok(())
    }
}
