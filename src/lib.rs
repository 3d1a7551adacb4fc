#![deny(warnings)]
#![deny(clippy::unwrap_used)]

//! Connect to an AWS instance over SSH and summarize remote directories.
//!
//! This crate is organized into the following modules:
//!
//! - `cli`: Command line flags
//! - `config`: Layered settings resolution (flags, config file, prompts)
//! - `error`: Error types and exit codes
//! - `ssh`: SSH connection and command execution
//! - `listing`: Parsing and summarizing `ls` output
//! - `report`: Plain-text output
//! - `app`: Invocation driver

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod listing;
pub mod report;
pub mod ssh;

pub use cli::Cli;
pub use error::AppError;
