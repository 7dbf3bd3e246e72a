//! Subcommand and one-shot mode implementations.

pub mod config;
pub mod email;
