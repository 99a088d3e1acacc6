//! Tooling
//!
//! Command-line interface wrapping the server.

pub mod cli;

pub use cli::{run, Cli, Commands};
