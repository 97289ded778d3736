//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a u_flags define such as `U_CFG_FOO` or `U_CFG_FOO=1`
    pub fn definition_token() -> impl Strategy<Value = String> {
        "[A-Z_][A-Z0-9_]{0,12}(=[a-z0-9]{1,4})?"
    }

    /// Generate a Zephyr board name
    pub fn board_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{1,8}(_[a-z0-9]{1,8}){0,3}"
    }

    /// Generate a build output name
    pub fn output_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,30}"
    }

    /// Generate a debugger serial, possibly empty or padded with blanks
    pub fn serial() -> impl Strategy<Value = String> {
        " {0,2}[0-9]{0,9} {0,2}"
    }
}
