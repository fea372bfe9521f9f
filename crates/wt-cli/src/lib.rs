//! Work timeline CLI library.
//!
//! This crate provides the CLI interface for work-timeline.

mod cli;
pub mod commands;
mod config;
pub mod repo;

pub use cli::{Cli, Commands};
pub use config::Config;
