//! CLI, configuration, analysis, feedback history, email delivery
//!
//! This crate provides the `meetcoach` command-line tool. A run fetches
//! meeting transcripts through [`meetcoach_notes`], asks an LLM for
//! coaching feedback, keeps a dated feedback history and report logs, and
//! emails the report.

pub mod analyzer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod email;
pub mod error;
pub mod feedback;
pub mod ledger;
pub mod report;
pub mod runner;
pub mod secret;

#[cfg(test)]
mod testing;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use runner::{RunOptions, RunOutcome, Runner};
