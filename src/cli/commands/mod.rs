//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod check;
pub mod clean;
pub mod flash;
pub mod log;
pub mod terminal;

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::defaults::{
    DEFAULT_BOARD_NAME, DEFAULT_BUILD_DIR, DEFAULT_MCU, DEFAULT_OUTPUT_NAME,
};
use crate::core::context::HostOs;
use crate::core::installation::{self, Installation};
use crate::core::settings::Settings;
use crate::infra::dirs::NrfDirs;
use crate::infra::packages::LocalPackageResolver;
use crate::infra::process::{CommandRunner, DryRunRunner, ShellRunner};

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the nRF Connect SDK toolchain is installed
    CheckInstallation,

    /// Build a project with west
    Build {
        /// CMake project directory (defaults to the ubxlib runner)
        #[arg(long)]
        cmake_dir: Option<PathBuf>,

        /// Zephyr board name
        #[arg(short, long, default_value = DEFAULT_BOARD_NAME)]
        board_name: String,

        /// Name of the build output
        #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
        output_name: String,

        /// Root of all build outputs
        #[arg(long, default_value = DEFAULT_BUILD_DIR)]
        build_dir: PathBuf,

        /// Space separated defines, used instead of the persisted flags
        #[arg(short, long, allow_hyphen_values = true)]
        u_flags: Option<String>,
    },

    /// Remove a build output
    Clean {
        /// Name of the build output
        #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
        output_name: String,

        /// Root of all build outputs
        #[arg(long, default_value = DEFAULT_BUILD_DIR)]
        build_dir: PathBuf,
    },

    /// Flash a build output to the target
    Flash {
        /// Debugger serial number (empty selects the first probe)
        #[arg(short, long, default_value = "")]
        debugger_serial: String,

        /// Name of the build output
        #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
        output_name: String,

        /// Root of all build outputs
        #[arg(long, default_value = DEFAULT_BUILD_DIR)]
        build_dir: PathBuf,

        /// Flash this hex file instead of the build's default image
        #[arg(long)]
        hex_file: Option<PathBuf>,
    },

    /// Stream the target's RTT log until Ctrl-C
    Log {
        /// Target MCU as known to J-Link
        #[arg(short, long, default_value = DEFAULT_MCU)]
        mcu: String,

        /// Debugger serial number
        #[arg(short, long)]
        debugger_serial: Option<String>,
    },

    /// Open a shell with the toolchain environment
    Terminal,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, workspace: &Workspace) -> Result<()> {
        match self {
            Self::CheckInstallation => check::execute(workspace).await,
            Self::Build {
                cmake_dir,
                board_name,
                output_name,
                build_dir,
                u_flags,
            } => {
                let options = build::BuildOptions {
                    cmake_dir,
                    board_name,
                    output_name,
                    build_dir,
                    u_flags,
                };
                build::execute(workspace, options).await
            }
            Self::Clean {
                output_name,
                build_dir,
            } => clean::execute(workspace, &output_name, &build_dir).await,
            Self::Flash {
                debugger_serial,
                output_name,
                build_dir,
                hex_file,
            } => {
                let current_dir = std::env::current_dir()?;
                let options = crate::core::flash::FlashOptions {
                    debugger_serial: Some(debugger_serial),
                    output_name,
                    build_dir,
                    hex_file,
                };
                flash::execute(workspace, &current_dir, &options).await
            }
            Self::Log {
                mcu,
                debugger_serial,
            } => log::execute(workspace, &mcu, debugger_serial).await,
            Self::Terminal => terminal::execute(workspace).await,
        }
    }
}

/// Everything a command needs from the environment
#[derive(Debug)]
pub struct Workspace {
    /// Resolved directories
    pub dirs: NrfDirs,
    /// User settings
    pub settings: Settings,
    /// Host flavour used for command lines
    pub host: HostOs,
    /// Print commands instead of running them
    pub dry_run: bool,
}

impl Workspace {
    /// Load directories and settings for the current user
    pub fn load(dry_run: bool) -> Result<Self> {
        let dirs = NrfDirs::new();
        let settings = Settings::load(&dirs).with_context(|| {
            format!("Failed to load settings from {}", dirs.settings_path().display())
        })?;
        tracing::debug!("Using directories {dirs:?}");

        Ok(Self {
            dirs,
            settings,
            host: HostOs::current(),
            dry_run,
        })
    }

    /// Package resolver configured from settings
    pub fn resolver(&self) -> LocalPackageResolver {
        LocalPackageResolver::new(
            self.settings.packages_root(&self.dirs),
            self.settings.packages.overrides.clone(),
        )
    }

    /// Runner for external commands
    pub fn runner(&self) -> Box<dyn CommandRunner> {
        if self.dry_run {
            Box::new(DryRunRunner)
        } else {
            Box::new(ShellRunner)
        }
    }

    /// Resolve the toolchain; every task starts here
    pub fn check_installation(&self) -> Result<Installation> {
        let resolver = self.resolver();
        installation::check_installation(&resolver, self.host)
            .context("nRF Connect SDK installation is incomplete")
    }
}
