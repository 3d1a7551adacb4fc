//! SSH connection and remote command execution.
//!
//! - `session`: russh client handler
//! - `auth`: private key authentication
//! - `client`: connection lifecycle and command execution
//!
//! Callers depend on [`RemoteSession`] rather than the russh types so the
//! directory survey can run against a stub in tests.

mod auth;
mod client;
mod session;

use async_trait::async_trait;

use crate::error::CommandError;

pub use auth::KeyAuth;
pub use client::{COMMAND_TIMEOUT, CONNECT_TIMEOUT, SshSession, build_client_config, connect};
pub use session::SshClientHandler;

/// Collected output of one remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the server did not report an exit status.
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into a [`CommandError`].
    pub fn into_result(self, command: &str) -> Result<Self, CommandError> {
        if self.success() {
            Ok(self)
        } else {
            Err(CommandError::NonZeroExit {
                command: command.to_string(),
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// An open session that can run shell commands on the remote host.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Run `command` and collect its output.
    ///
    /// A non-zero exit status is not an error here; see
    /// [`CommandOutput::into_result`].
    async fn run(&self, command: &str) -> Result<CommandOutput, CommandError>;
}
