//! Command-line plumbing for the `zdeflate` binary: display-level globals,
//! argument parsing, and help text.

pub mod args;
pub mod constants;
pub mod help;
