//! Tooling
//!
//! Command-line access to override resolution, for checking what a wrapped
//! callable would see under the current environment.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
