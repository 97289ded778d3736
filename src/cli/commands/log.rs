//! CLI implementation for `nrfconnect log`
//!
//! Starts J-Link, then streams RTT output to stdout until Ctrl-C.

use anyhow::{Context, Result};

use crate::cli::commands::Workspace;
use crate::cli::output::{create_spinner, print_info};
use crate::core::flash::normalize_serial;
use crate::core::log::stream_log;
use crate::infra::rtt::{JLinkRttReader, RttOptions};

/// Execute the log command
pub async fn execute(workspace: &Workspace, mcu: &str, debugger_serial: Option<String>) -> Result<()> {
    workspace.check_installation()?;

    let settings = &workspace.settings;
    let options = RttOptions {
        jlink_exe: settings.jlink_exe().to_string(),
        mcu: mcu.to_string(),
        serial: normalize_serial(debugger_serial.as_deref()).map(str::to_string),
        interface: settings.interface().to_string(),
        speed_khz: settings.speed_khz(),
        telnet_port: settings.telnet_port(),
    };

    if workspace.dry_run {
        println!("[dry-run] {} {}", options.jlink_exe, options.jlink_args().join(" "));
        return Ok(());
    }

    let spinner = create_spinner(&format!("Connecting to {mcu} via J-Link..."));
    let opened = JLinkRttReader::open(&options).await;
    spinner.finish_and_clear();
    let mut reader = opened.with_context(|| format!("Failed to open RTT log for {mcu}"))?;

    print_info("Streaming RTT log, press Ctrl-C to stop");
    let result = stream_log(&mut reader, &mut tokio::io::stdout(), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await;
    reader.close().await;

    result.context("RTT log stopped")
}
