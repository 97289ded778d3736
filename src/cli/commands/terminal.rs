//! CLI implementation for `nrfconnect terminal`

use anyhow::{Context, Result};

use crate::cli::commands::Workspace;
use crate::core::terminal::run_terminal;

/// Execute the terminal command
pub async fn execute(workspace: &Workspace) -> Result<()> {
    let installation = workspace.check_installation()?;
    let runner = workspace.runner();
    run_terminal(&*runner, &installation.context).context("Terminal exited with an error")
}
