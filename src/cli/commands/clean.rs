//! CLI implementation for `nrfconnect clean`

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::commands::Workspace;
use crate::cli::output::print_success;
use crate::core::build::output_dir;
use crate::core::clean::{clean_output, CleanResult};

/// Execute the clean command
pub async fn execute(workspace: &Workspace, output_name: &str, build_dir: &Path) -> Result<()> {
    workspace.check_installation()?;

    if workspace.dry_run {
        println!(
            "[dry-run] remove {}",
            output_dir(build_dir, output_name).display()
        );
        return Ok(());
    }

    let result = clean_output(build_dir, output_name)
        .with_context(|| format!("Failed to clean {output_name}"))?;

    match result {
        CleanResult::Removed(dir) => print_success(&format!("Removed {}", dir.display())),
        CleanResult::NothingToClean(_) => print_success("Nothing to clean"),
    }
    Ok(())
}
