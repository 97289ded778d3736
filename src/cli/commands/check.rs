//! CLI implementation for `nrfconnect check-installation`
//!
//! Resolves the required packages and reports the environment that the
//! other tasks will run with.

use anyhow::Result;

use crate::cli::output::{print_detail, print_info, print_success, print_warning};
use crate::cli::commands::Workspace;
use crate::config::defaults::REQUIRED_PACKAGES;
use crate::core::context::HostOs;

/// Execute the check-installation command
pub async fn execute(workspace: &Workspace) -> Result<()> {
    let installation = workspace.check_installation()?;

    print_success("nRF Connect SDK installation found");
    for name in REQUIRED_PACKAGES {
        if let Some(package) = installation.packages.get(name) {
            let version = package
                .version
                .as_ref()
                .map(|v| format!(" ({v})"))
                .unwrap_or_default();
            print_detail(&format!(
                "{name}{version}: {}",
                package.install_path.display()
            ));
        }
    }

    let context = &installation.context;
    match context.host {
        HostOs::Windows => {
            print_info(&format!("Commands are prefixed with: {}", context.pre_command));
        }
        HostOs::Posix => {
            print_info("Environment for west:");
            for (key, value) in &context.env {
                print_detail(&format!("{key}={value}"));
            }
            // On Windows these come from env.cmd, so only the PATH is checked here
            let jlink = workspace.settings.jlink_exe();
            for tool in ["west", jlink] {
                if which::which(tool).is_err() {
                    print_warning(&format!("{tool} was not found on PATH"));
                }
            }
        }
    }

    Ok(())
}
