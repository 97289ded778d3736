//! nrfconnect-tasks - nRF Connect SDK task runner
//!
//! This library provides the tasks used to work with ubxlib on the nRF
//! Connect SDK: checking the toolchain installation, building with west,
//! cleaning outputs, flashing, streaming the RTT log and opening a shell
//! with the toolchain environment.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Task logic
//! - [`infra`] - Infrastructure layer (filesystem, processes, RTT)
//! - [`config`] - Constants and defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
