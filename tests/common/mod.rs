//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Packages every task needs
pub const REQUIRED_PACKAGES: [&str; 3] = ["arm_embedded_gcc", "nrfconnectsdk", "make"];

/// Test environment
///
/// Creates a temporary directory holding the packages root, the settings
/// directory, the ubxlib checkout and a working directory, and runs the
/// binary against them.
pub struct TestProject {
    /// Temporary directory for the test environment
    pub dir: TempDir,
}

impl TestProject {
    /// Create an empty environment with no packages installed
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        };
        for dir in ["pkgs", "config", "ubxlib", "work", "bin"] {
            project.create_dir(dir);
        }
        project
    }

    /// Create an environment with all required packages installed
    pub fn installed() -> Self {
        let project = Self::new();
        for name in REQUIRED_PACKAGES {
            project.create_dir(&format!("pkgs/{name}"));
        }
        project.create_dir("pkgs/nrfconnectsdk/toolchain");
        project
    }

    /// Get the root of the test environment
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Working directory the binary runs in
    pub fn work_dir(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    /// Create a file in the test environment
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test environment
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test environment
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test environment
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Install a fake `west` that appends its arguments and `U_FLAGS` to
    /// `west.log`
    #[cfg(unix)]
    pub fn install_fake_west(&self) {
        use std::os::unix::fs::PermissionsExt;

        let log = self.dir.path().join("west.log");
        self.create_file(
            "bin/west",
            &format!(
                "#!/bin/sh\necho \"$* U_FLAGS=$U_FLAGS\" >> '{}'\n",
                log.display()
            ),
        );
        let script = self.dir.path().join("bin/west");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake west executable");
    }

    /// Lines written by the fake `west`
    pub fn west_calls(&self) -> Vec<String> {
        if !self.file_exists("west.log") {
            return Vec::new();
        }
        self.read_file("west.log").lines().map(str::to_string).collect()
    }

    /// Command for the binary with the environment pointing into this project
    pub fn command(&self) -> Command {
        let root = self.dir.path();
        let path = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![root.join("bin")];
        paths.extend(std::env::split_paths(&path));

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_nrfconnect"));
        cmd.current_dir(self.work_dir())
            .env("NRFCONNECT_CONFIG_DIR", root.join("config"))
            .env("UBXLIB_PKG_DIR", root.join("pkgs"))
            .env("UBXLIB_DIR", root.join("ubxlib"))
            .env("PATH", std::env::join_paths(paths).expect("Invalid PATH"))
            .env("SHELL", "/bin/sh")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run the binary with arguments
    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute nrfconnect")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Stdout and stderr of an output as strings
pub fn streams(output: &Output) -> (String, String) {
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}
