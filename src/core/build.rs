//! Build logic
//!
//! Assembles the `west build` invocation for an nRF Connect SDK application.

use std::path::{Path, PathBuf};

use crate::core::context::{quote_arg, RunContext};
use crate::core::flags::{resolve_flags, FlagSource, Pristine};
use crate::error::BuildError;
use crate::infra::process::CommandRunner;

/// Configuration of a single build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Zephyr board name
    pub board_name: String,
    /// CMake project directory
    pub cmake_dir: PathBuf,
    /// Output name (build sub folder)
    pub output_name: String,
    /// Output build directory
    pub build_dir: PathBuf,
    /// Pristine mode passed to west
    pub pristine: Pristine,
}

impl BuildConfig {
    /// Directory the build writes to: `<build_dir>/<output_name>`
    pub fn output_dir(&self) -> PathBuf {
        output_dir(&self.build_dir, &self.output_name)
    }

    /// The `west build` command line
    pub fn command(&self) -> String {
        format!(
            "west build -p {} -b {} {} --build-dir {}",
            self.pristine,
            self.board_name,
            quote_arg(&path_arg(&self.cmake_dir)),
            quote_arg(&path_arg(&self.output_dir())),
        )
    }
}

/// Build output directory for an output name
pub fn output_dir(build_dir: &Path, output_name: &str) -> PathBuf {
    build_dir.join(output_name)
}

/// Render a path for a command line, with forward slashes
pub(crate) fn path_arg(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Resolve flags, then run `west build`
///
/// The context receives `U_FLAGS`; `config.pristine` is overridden by the
/// flag resolution.
pub fn run_build(
    runner: &dyn CommandRunner,
    context: &mut RunContext,
    mut config: BuildConfig,
    u_flags: Option<&str>,
    flags: &impl FlagSource,
    subsystem: &str,
) -> Result<BuildConfig, BuildError> {
    let resolution = resolve_flags(u_flags, flags, subsystem, &config.output_name)?;
    resolution.apply(context);
    config.pristine = resolution.pristine;

    let command = config.command();
    tracing::info!(
        "Building {} for {} into {}",
        config.cmake_dir.display(),
        config.board_name,
        config.output_dir().display()
    );
    runner.run(&context.invocation(&command))?;
    Ok(config)
}
