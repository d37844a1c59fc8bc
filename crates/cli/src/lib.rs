//! Terminal helpers for the `workorder` command
//!
//! Provides shared CLI functionality:
//! - Output formats, tables and status messages
//! - Progress indicators

#![warn(missing_docs)]

pub mod output;
pub mod progress;

pub use output::{OutputFormat, Status, Table};
