//! External process execution
//!
//! Runs assembled command lines through the host shell. The exit status of
//! the child is the only success signal; its output goes straight to the
//! terminal.

use std::io::IsTerminal;
use std::process::Command;

use crate::core::context::Invocation;
use crate::error::ProcessError;

/// Executes external commands
pub trait CommandRunner {
    /// Run an invocation to completion
    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError>;
}

/// Runs commands through the host shell, inheriting stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        tracing::debug!("Running: {} {} {}", invocation.shell, invocation.shell_flag, invocation.line);

        if invocation.interactive && !std::io::stdin().is_terminal() {
            tracing::warn!("stdin is not a terminal, the shell will not be interactive");
        }

        let mut cmd = Command::new(&invocation.shell);
        cmd.arg(invocation.shell_flag);
        add_line(&mut cmd, &invocation.line);
        cmd.envs(&invocation.env);

        let status = cmd.status().map_err(|e| ProcessError::Spawn {
            command: invocation.line.clone(),
            error: e.to_string(),
        })?;

        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(ProcessError::Failed {
                command: invocation.line.clone(),
                code,
            }),
            None => Err(ProcessError::Terminated {
                command: invocation.line.clone(),
            }),
        }
    }
}

#[cfg(windows)]
fn add_line(cmd: &mut Command, line: &str) {
    use std::os::windows::process::CommandExt;
    // cmd.exe parses the rest of its command line itself
    cmd.raw_arg(cmd_line(line));
}

/// Wrap a line for `cmd /C`, which strips one outer pair of quotes
/// whenever the line holds more than two
#[cfg_attr(not(windows), allow(dead_code))]
fn cmd_line(line: &str) -> String {
    format!("\"{line}\"")
}

#[cfg(not(windows))]
fn add_line(cmd: &mut Command, line: &str) {
    cmd.arg(line);
}

/// Prints commands instead of running them
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        for (key, value) in &invocation.env {
            println!("[dry-run] {key}={value}");
        }
        println!("[dry-run] {}", invocation.line);
        Ok(())
    }
}

/// Records invocations without running anything
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: std::cell::RefCell<Vec<Invocation>>,
    exit_code: i32,
}

#[cfg(test)]
impl RecordingRunner {
    /// Runner whose commands all fail with `exit_code`
    pub fn failing(exit_code: i32) -> Self {
        Self {
            calls: std::cell::RefCell::default(),
            exit_code,
        }
    }

    /// Invocations seen so far
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

#[cfg(test)]
impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        self.calls.borrow_mut().push(invocation.clone());
        if self.exit_code == 0 {
            Ok(())
        } else {
            Err(ProcessError::Failed {
                command: invocation.line.clone(),
                code: self.exit_code,
            })
        }
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::context::{HostOs, RunContext};

    fn context() -> RunContext {
        RunContext::new(HostOs::Posix).with_shell("/bin/sh")
    }

    #[test]
    fn test_shell_runner_success() {
        assert!(ShellRunner.run(&context().invocation("true")).is_ok());
    }

    #[test]
    fn test_shell_runner_reports_exit_code() {
        let err = ShellRunner.run(&context().invocation("exit 3")).unwrap_err();
        assert!(matches!(err, ProcessError::Failed { code: 3, .. }));
    }

    #[test]
    fn test_shell_runner_passes_environment() {
        let mut ctx = context();
        ctx.set_env("NRF_TEST_VALUE", "42");
        assert!(ShellRunner
            .run(&ctx.invocation("test \"$NRF_TEST_VALUE\" = 42"))
            .is_ok());
    }

    #[test]
    fn test_shell_runner_missing_shell() {
        let ctx = RunContext::new(HostOs::Posix).with_shell("/nonexistent/shell");
        assert!(matches!(
            ShellRunner.run(&ctx.invocation("true")),
            Err(ProcessError::Spawn { .. })
        ));
    }
}
