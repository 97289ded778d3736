//! Settings management
//!
//! Reads optional settings from `config.toml` in the config directory.
//! Settings cover where toolchain packages live, the project directories
//! used by `build`, and how the J-Link RTT reader is started.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::error::SettingsError;
use crate::infra::dirs::NrfDirs;

/// Settings for nrfconnect-tasks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Toolchain package locations
    #[serde(default)]
    pub packages: PackagesConfig,

    /// Project directories
    #[serde(default)]
    pub project: ProjectConfig,

    /// J-Link RTT settings
    #[serde(default)]
    pub rtt: RttConfig,
}

/// Toolchain package locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackagesConfig {
    /// Root directory of installed packages
    pub root: Option<PathBuf>,

    /// Per-package overrides, keyed by package name
    #[serde(flatten)]
    pub overrides: BTreeMap<String, PackageOverride>,
}

/// Explicit location of a single package
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageOverride {
    /// Install path
    pub path: Option<PathBuf>,

    /// Windows toolchain directory (nRF Connect SDK only)
    pub windows_toolchain_path: Option<PathBuf>,
}

/// Project directories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory holding `u_flags.toml`
    pub flags_dir: Option<PathBuf>,

    /// Default CMake project directory
    pub cmake_dir: Option<PathBuf>,
}

/// J-Link RTT settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RttConfig {
    /// J-Link commander executable
    pub jlink_exe: Option<String>,

    /// RTT telnet port
    pub telnet_port: Option<u16>,

    /// Interface speed in kHz
    pub speed_khz: Option<u32>,

    /// Target interface (SWD or JTAG)
    pub interface: Option<String>,
}

impl Settings {
    /// Load settings from the config directory
    ///
    /// If the settings file doesn't exist, returns default settings.
    pub fn load(dirs: &NrfDirs) -> Result<Self, SettingsError> {
        Self::load_from_path(&dirs.settings_path())
    }

    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective packages root
    #[must_use]
    pub fn packages_root(&self, dirs: &NrfDirs) -> PathBuf {
        self.packages
            .root
            .clone()
            .unwrap_or_else(|| dirs.packages_dir().to_path_buf())
    }

    /// Effective directory holding `u_flags.toml`
    #[must_use]
    pub fn flags_dir(&self, dirs: &NrfDirs) -> PathBuf {
        self.project
            .flags_dir
            .clone()
            .unwrap_or_else(|| dirs.default_flags_dir())
    }

    /// Effective default CMake project directory
    #[must_use]
    pub fn cmake_dir(&self, dirs: &NrfDirs) -> PathBuf {
        self.project
            .cmake_dir
            .clone()
            .unwrap_or_else(|| dirs.default_cmake_dir())
    }

    /// Effective J-Link executable
    #[must_use]
    pub fn jlink_exe(&self) -> &str {
        self.rtt
            .jlink_exe
            .as_deref()
            .unwrap_or(defaults::DEFAULT_JLINK_EXE)
    }

    /// Effective RTT telnet port
    #[must_use]
    pub fn telnet_port(&self) -> u16 {
        self.rtt
            .telnet_port
            .unwrap_or(defaults::DEFAULT_RTT_TELNET_PORT)
    }

    /// Effective J-Link interface speed
    #[must_use]
    pub fn speed_khz(&self) -> u32 {
        self.rtt.speed_khz.unwrap_or(defaults::DEFAULT_JLINK_SPEED_KHZ)
    }

    /// Effective J-Link target interface
    #[must_use]
    pub fn interface(&self) -> &str {
        self.rtt
            .interface
            .as_deref()
            .unwrap_or(defaults::DEFAULT_JLINK_INTERFACE)
    }
}
