//! Platform-specific directory management
//!
//! Provides the paths the tasks need: the settings directory, the root of
//! installed toolchain packages and the ubxlib checkout.
//!
//! Environment variables can override default directories:
//! - `NRFCONNECT_CONFIG_DIR` - Override config directory
//! - `UBXLIB_PKG_DIR` - Override the toolchain packages root
//! - `UBXLIB_DIR` - Override the ubxlib checkout root

use std::env;
use std::path::{Path, PathBuf};

use crate::config::defaults::{DEFAULT_CMAKE_SUBDIR, DEFAULT_FLAGS_SUBDIR};

/// Environment variable names for directory overrides
pub const ENV_CONFIG_DIR: &str = "NRFCONNECT_CONFIG_DIR";
pub const ENV_PACKAGES_DIR: &str = "UBXLIB_PKG_DIR";
pub const ENV_UBXLIB_DIR: &str = "UBXLIB_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "nrfconnect-tasks";

/// Default packages directory name under the home directory
const PACKAGES_DIR_NAME: &str = ".ubxlibpkg";

/// Directory provider for nrfconnect-tasks
#[derive(Debug, Clone)]
pub struct NrfDirs {
    config_dir: PathBuf,
    packages_dir: PathBuf,
    ubxlib_dir: PathBuf,
}

impl NrfDirs {
    /// Create a new `NrfDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
            packages_dir: Self::resolve_packages_dir(),
            ubxlib_dir: Self::resolve_ubxlib_dir(),
        }
    }

    /// Create an instance with explicit paths
    #[must_use]
    pub fn with_paths(config_dir: PathBuf, packages_dir: PathBuf, ubxlib_dir: PathBuf) -> Self {
        Self {
            config_dir,
            packages_dir,
            ubxlib_dir,
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/nrfconnect-tasks` or `~/.config/nrfconnect-tasks`
    /// - macOS: `~/Library/Application Support/nrfconnect-tasks`
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Root directory of installed toolchain packages (`~/.ubxlibpkg`)
    #[must_use]
    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    /// Root of the ubxlib checkout
    #[must_use]
    pub fn ubxlib_dir(&self) -> &Path {
        &self.ubxlib_dir
    }

    /// Default CMake project directory for `build`
    #[must_use]
    pub fn default_cmake_dir(&self) -> PathBuf {
        self.ubxlib_dir.join(DEFAULT_CMAKE_SUBDIR)
    }

    /// Default directory holding `u_flags.toml`
    #[must_use]
    pub fn default_flags_dir(&self) -> PathBuf {
        self.ubxlib_dir.join(DEFAULT_FLAGS_SUBDIR)
    }

    /// Get the settings file path
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }

    fn resolve_packages_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_PACKAGES_DIR) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| h.join(PACKAGES_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(PACKAGES_DIR_NAME))
    }

    fn resolve_ubxlib_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_UBXLIB_DIR) {
            return PathBuf::from(path);
        }

        env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

impl Default for NrfDirs {
    fn default() -> Self {
        Self::new()
    }
}
