//! Error types for nrfconnect-tasks
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Toolchain package resolution errors
#[derive(Error, Debug)]
pub enum PackageError {
    /// Package is not installed
    #[error("Package '{name}' not found in {root}. Install it or set its path in the settings file")]
    NotFound { name: String, root: PathBuf },

    /// Windows toolchain directory missing for a package
    #[error("Package '{name}' has no Windows toolchain at '{path}'")]
    MissingToolchain { name: String, path: PathBuf },
}

/// Settings file errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Persisted u_flags errors
#[derive(Error, Debug)]
pub enum FlagsError {
    /// Flags file is not valid TOML
    #[error("Failed to parse u_flags file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Flags entry has an unsupported type
    #[error("u_flags entry '{subsystem}.{output_name}' must be a string or an array of strings")]
    InvalidEntry {
        subsystem: String,
        output_name: String,
    },

    /// Filesystem error while reading or recording flags
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Flags could not be resolved
    #[error(transparent)]
    Flags(#[from] FlagsError),

    /// `west build` failed
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// External process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Process could not be started
    #[error("Failed to start '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Process exited with a non-zero status
    #[error("Command '{command}' failed with exit code {code}")]
    Failed { command: String, code: i32 },

    /// Process was killed by a signal
    #[error("Command '{command}' was terminated by a signal")]
    Terminated { command: String },
}

/// J-Link RTT errors
#[derive(Error, Debug)]
pub enum RttError {
    /// J-Link executable could not be started
    #[error("Failed to start J-Link ('{program}'): {error}")]
    Spawn { program: String, error: String },

    /// Something else already listens on the RTT port
    #[error("RTT port {address} is already in use; stop the other J-Link session or change rtt.telnet_port")]
    PortInUse { address: String },

    /// J-Link exited before its RTT server came up
    #[error("J-Link exited ({status}) before the RTT server came up{}", output_suffix(.output))]
    Exited { status: String, output: String },

    /// RTT telnet server never became reachable
    #[error("Could not connect to the J-Link RTT server at {address}: {error}")]
    Connect { address: String, error: String },

    /// The RTT stream was closed by the J-Link side
    #[error("RTT connection closed by J-Link")]
    Closed,

    /// IO error while streaming the log
    #[error("RTT log I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

fn output_suffix(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(": {output}")
    }
}
