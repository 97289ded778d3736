//! Core task logic
//!
//! This module contains the logic behind each task. External commands go
//! through [`crate::infra::process::CommandRunner`] and packages through
//! [`crate::infra::packages::PackageResolver`], so everything here can be
//! tested without a toolchain.
//!
//! # Submodules
//!
//! - [`settings`] - User settings (config.toml)
//! - [`context`] - Host, environment and pre-command for external commands
//! - [`installation`] - Toolchain package check and context setup
//! - [`flags`] - u_flags resolution and change detection
//! - [`build`] - `west build` invocation
//! - [`clean`] - Build output removal
//! - [`flash`] - `west flash` invocation
//! - [`log`] - RTT log streaming
//! - [`terminal`] - Interactive toolchain shell

pub mod build;
pub mod clean;
pub mod context;
pub mod flags;
pub mod flash;
pub mod installation;
pub mod log;
pub mod settings;
pub mod terminal;
