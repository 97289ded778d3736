//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, package lookup, external
//! processes and the J-Link RTT connection.

pub mod dirs;
pub mod filesystem;
pub mod packages;
pub mod process;
pub mod rtt;
