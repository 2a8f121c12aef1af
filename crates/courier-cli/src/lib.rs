//! Library interface for courier-cli
//!
//! Exposes the argument parser and command handlers for integration testing.

/// Command-line argument definitions.
pub mod cli;
/// Command handlers wiring config → registry → orchestrator.
pub mod handlers;

pub use cli::{Cli, Command};
