//! Per-invocation run context
//!
//! Carries the shell prefix and environment variables every external
//! command of a single invocation runs with.

use std::collections::BTreeMap;
use std::fmt;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    /// Linux, macOS and other POSIX hosts
    Posix,
    /// Windows hosts
    Windows,
}

impl HostOs {
    /// Host family this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Default interactive shell for this host family
    pub fn default_shell(self) -> String {
        match self {
            Self::Posix => std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string()),
            Self::Windows => {
                std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
            }
        }
    }

    /// Flag passing a command line to the shell
    pub fn shell_command_flag(self) -> &'static str {
        match self {
            Self::Posix => "-c",
            Self::Windows => "/C",
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix => write!(f, "posix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Command prefix and environment for one CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Host family the commands run on
    pub host: HostOs,
    /// Prefix put in front of every command (Windows toolchain setup)
    pub pre_command: String,
    /// Environment variables passed to every command
    pub env: BTreeMap<String, String>,
    /// Shell used to run command lines
    pub shell: String,
}

impl RunContext {
    /// Create an empty context for `host`
    pub fn new(host: HostOs) -> Self {
        Self {
            host,
            pre_command: String::new(),
            env: BTreeMap::new(),
            shell: host.default_shell(),
        }
    }

    /// Use a specific shell
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Set an environment variable for subsequent commands
    pub fn set_env(&mut self, key: &str, value: impl Into<String>) {
        self.env.insert(key.to_string(), value.into());
    }

    /// Build the invocation for a command line
    pub fn invocation(&self, command: &str) -> Invocation {
        Invocation {
            line: format!("{}{command}", self.pre_command),
            env: self.env.clone(),
            shell: self.shell.clone(),
            shell_flag: self.host.shell_command_flag(),
            interactive: false,
        }
    }

    /// Build the invocation for an interactive shell session
    pub fn interactive_shell(&self) -> Invocation {
        Invocation {
            interactive: true,
            ..self.invocation(&self.shell)
        }
    }
}

/// A fully assembled external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command line including the pre-command
    pub line: String,
    /// Environment variables added to the child
    pub env: BTreeMap<String, String>,
    /// Shell executing the line
    pub shell: String,
    /// Shell flag introducing the line
    pub shell_flag: &'static str,
    /// Whether the child needs an interactive terminal
    pub interactive: bool,
}

/// Quote a command line argument if it contains whitespace
pub fn quote_arg(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) && !arg.starts_with('"') {
        format!("\"{arg}\"")
    } else {
        arg.to_string()
    }
}
