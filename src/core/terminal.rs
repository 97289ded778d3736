//! Toolchain terminal
//!
//! Opens an interactive shell with the toolchain environment applied.

use crate::core::context::RunContext;
use crate::error::ProcessError;
use crate::infra::process::CommandRunner;

/// Run an interactive shell until the user exits it
pub fn run_terminal(runner: &dyn CommandRunner, context: &RunContext) -> Result<(), ProcessError> {
    tracing::info!("Opening {} with the nRF Connect SDK environment", context.shell);
    runner.run(&context.interactive_shell())
}
