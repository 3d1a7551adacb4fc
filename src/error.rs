//! Error types for configuration, connection and remote command failures.
//!
//! Failures fall into three categories, each with its own enum:
//!
//! 1. [`ConfigError`]: a setting is missing or invalid. Raised before any
//!    network activity.
//! 2. [`ConnectionError`]: the SSH session could not be established. Fatal for
//!    the invocation and never retried.
//! 3. [`CommandError`]: a remote command failed. Reported per command; only a
//!    dropped session stops the remaining commands.
//!
//! [`AppError`] wraps all three for the binary and maps each to an exit code.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Exit code for configuration and local I/O failures.
pub const EXIT_CONFIG: u8 = 1;

/// Exit code when the SSH session could not be established.
pub const EXIT_CONNECTION: u8 = 2;

/// Exit code when one or more remote commands failed.
pub const EXIT_COMMAND: u8 = 3;

/// A setting could not be resolved or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} is required (set {key} in the config file, pass --{flag}, or enter it when prompted)")]
    MissingRequiredField {
        field: &'static str,
        key: &'static str,
        flag: &'static str,
    },

    #[error("invalid SSH key path {}: {reason}", path.display())]
    InvalidKeyPath { path: PathBuf, reason: String },

    #[error("invalid SSH port {value:?}: expected an integer between 1 and 65535")]
    InvalidPort { value: String },

    #[error("failed to read config file {}: {message}", path.display())]
    ConfigFile { path: PathBuf, message: String },

    #[error("failed to save config file {}: {source}", path.display())]
    SaveConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read interactive input: {0}")]
    Prompt(#[from] io::Error),
}

/// The SSH session could not be opened or authenticated.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection to {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    #[error("failed to connect to {target}: {source}")]
    Unreachable {
        target: String,
        #[source]
        source: russh::Error,
    },

    #[error("authentication failed for {target}: {message}")]
    Auth { target: String, message: String },
}

/// A single remote command did not complete successfully.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("`{command}` exited with status {exit_code}: {}", stderr.trim())]
    NonZeroExit {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("failed to run `{command}`: {message}")]
    Channel { command: String, message: String },

    #[error("session closed while running `{command}`")]
    SessionClosed { command: String },
}

impl CommandError {
    /// Whether the session is gone and no further commands can run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::SessionClosed { .. })
    }
}

/// Top-level failure of one invocation.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{failed} of {total} remote command(s) failed")]
    Commands { failed: usize, total: usize },

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl AppError {
    /// Process exit code for this failure. Always non-zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Output(_) => EXIT_CONFIG,
            AppError::Connection(_) => EXIT_CONNECTION,
            AppError::Command(_) | AppError::Commands { .. } => EXIT_COMMAND,
        }
    }
}
