//! Flash logic
//!
//! Assembles the `west flash` invocation. The image is taken from the build
//! output directory unless an explicit hex file is given; the target is
//! always erased first and never rebuilt.

use std::path::{Path, PathBuf};

use crate::core::build::{output_dir, path_arg};
use crate::core::context::{quote_arg, RunContext};
use crate::error::ProcessError;
use crate::infra::process::CommandRunner;

/// Trim a debugger serial; empty or blank means "any probe"
pub fn normalize_serial(serial: Option<&str>) -> Option<&str> {
    serial.map(str::trim).filter(|s| !s.is_empty())
}

/// Flash options from CLI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashOptions {
    /// Debugger serial number; empty means "any probe"
    pub debugger_serial: Option<String>,
    /// Output name (build sub folder)
    pub output_name: String,
    /// Output build directory
    pub build_dir: PathBuf,
    /// Explicit hex file to flash
    pub hex_file: Option<PathBuf>,
}

impl FlashOptions {
    /// Serial number, with a blank string treated as absent
    pub fn serial(&self) -> Option<&str> {
        normalize_serial(self.debugger_serial.as_deref())
    }

    /// Absolute build output directory, relative paths taken from `cwd`
    pub fn absolute_output_dir(&self, cwd: &Path) -> PathBuf {
        let dir = output_dir(&self.build_dir, &self.output_name);
        if dir.is_absolute() {
            dir
        } else {
            cwd.join(dir)
        }
    }

    /// The `west flash` command line
    pub fn command(&self, cwd: &Path) -> String {
        let mut parts = vec!["west flash --skip-rebuild".to_string()];

        if let Some(hex) = &self.hex_file {
            parts.push(format!("--hex-file {}", quote_arg(&path_arg(hex))));
        }

        parts.push(format!(
            "-d {}",
            quote_arg(&path_arg(&self.absolute_output_dir(cwd)))
        ));

        if let Some(serial) = self.serial() {
            parts.push(format!("--snr {serial}"));
        }

        parts.push("--erase".to_string());
        parts.join(" ")
    }
}

/// Run `west flash`
pub fn run_flash(
    runner: &dyn CommandRunner,
    context: &RunContext,
    options: &FlashOptions,
    cwd: &Path,
) -> Result<(), ProcessError> {
    match options.serial() {
        Some(serial) => tracing::info!("Flashing via debugger {serial}"),
        None => tracing::info!("Flashing via the first available debugger"),
    }
    runner.run(&context.invocation(&options.command(cwd)))
}
