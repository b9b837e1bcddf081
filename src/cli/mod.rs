//! Command-line interface
//!
//! Argument definitions and output formatting for the resetctl binary.

pub mod args;
pub mod output;

pub use args::{Cli, Commands, OutputFormat};
