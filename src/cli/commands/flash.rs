//! CLI implementation for `nrfconnect flash`

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::commands::Workspace;
use crate::cli::output::print_success;
use crate::core::flash::{run_flash, FlashOptions};

/// Execute the flash command
pub async fn execute(workspace: &Workspace, cwd: &Path, options: &FlashOptions) -> Result<()> {
    let installation = workspace.check_installation()?;

    let runner = workspace.runner();
    run_flash(&*runner, &installation.context, options, cwd)
        .with_context(|| format!("Failed to flash {}", options.output_name))?;

    if !workspace.dry_run {
        print_success(&format!("Flashed {}", options.output_name));
    }
    Ok(())
}
