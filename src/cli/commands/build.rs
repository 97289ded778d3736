//! CLI implementation for `nrfconnect build`

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::commands::Workspace;
use crate::cli::output::{print_detail, print_success};
use crate::config::defaults::SUBSYSTEM;
use crate::core::build::{run_build, BuildConfig};
use crate::core::flags::{FileFlagSource, Pristine};

/// Build options from CLI
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// CMake project directory, `None` for the configured default
    pub cmake_dir: Option<PathBuf>,
    /// Zephyr board name
    pub board_name: String,
    /// Output name
    pub output_name: String,
    /// Root of all build outputs
    pub build_dir: PathBuf,
    /// Flags given on the command line
    pub u_flags: Option<String>,
}

/// Execute the build command
pub async fn execute(workspace: &Workspace, options: BuildOptions) -> Result<()> {
    let installation = workspace.check_installation()?;
    let mut context = installation.context;

    let output_name = options.output_name.clone();
    let config = BuildConfig {
        board_name: options.board_name,
        cmake_dir: options
            .cmake_dir
            .unwrap_or_else(|| workspace.settings.cmake_dir(&workspace.dirs)),
        output_name: options.output_name,
        build_dir: options.build_dir,
        pristine: Pristine::Auto,
    };

    let mut flags = FileFlagSource::new(workspace.settings.flags_dir(&workspace.dirs));
    if workspace.dry_run {
        flags = flags.read_only();
    }

    let runner = workspace.runner();
    let config = run_build(
        &*runner,
        &mut context,
        config,
        options.u_flags.as_deref(),
        &flags,
        SUBSYSTEM,
    )
    .with_context(|| format!("Failed to build {output_name}"))?;

    if !workspace.dry_run {
        print_success(&format!("Built {}", config.output_name));
        print_detail(&format!("Output: {}", config.output_dir().display()));
    }
    Ok(())
}
