//! Command line support
//!
//! Command handlers return their output as a string; the binary prints it.

pub mod commands;
pub mod error;

pub use error::CliError;
