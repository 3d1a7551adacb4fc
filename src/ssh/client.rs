//! SSH connection lifecycle and command execution.
//!
//! ## Connection Lifecycle
//!
//! 1. **Client Configuration**: Build the russh client configuration with
//!    inactivity timeout and keepalive settings.
//!
//! 2. **Connection Establishment**: Open the TCP connection to
//!    `host:port`, bounded by [`CONNECT_TIMEOUT`].
//!
//! 3. **Authentication**: Public key authentication with the resolved key
//!    file via [`KeyAuth`].
//!
//! 4. **Command Execution**: Each command gets its own session channel;
//!    stdout, stderr and the exit code are collected until the channel
//!    closes or [`COMMAND_TIMEOUT`] expires.
//!
//! 5. **Disconnect**: The session is closed once all commands have run.
//!
//! Failures are never retried. A connection failure ends the invocation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::{ChannelMsg, Disconnect, client};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{CommandError, ConnectionError};
use crate::ssh::{CommandOutput, KeyAuth, RemoteSession, SshClientHandler};

/// TCP connect and handshake timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-command execution timeout
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(180);

/// Keepalive interval while the session is open
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Build russh client configuration.
///
/// Creates an `Arc<client::Config>` with:
/// - Inactivity timeout set to `timeout`
/// - Keepalive interval of 30 seconds with max 3 keepalives
pub fn build_client_config(timeout: Duration) -> Arc<client::Config> {
    Arc::new(client::Config {
        inactivity_timeout: Some(timeout),
        keepalive_interval: Some(KEEPALIVE_INTERVAL),
        keepalive_max: 3,
        ..Default::default()
    })
}

/// An authenticated SSH session.
pub struct SshSession {
    handle: client::Handle<SshClientHandler>,
    target: String,
    command_timeout: Duration,
}

/// Connect to the host named in `settings` and authenticate with its key.
///
/// # Errors
///
/// * [`ConnectionError::Timeout`] - No connection within [`CONNECT_TIMEOUT`]
/// * [`ConnectionError::Unreachable`] - TCP or handshake failure
/// * [`ConnectionError::Auth`] - The key could not be loaded or was rejected
pub async fn connect(settings: &Settings) -> Result<SshSession, ConnectionError> {
    let target = settings.target();
    info!("Connecting to {}...", target);

    // The inactivity timeout also bounds a single silent command
    let config = build_client_config(COMMAND_TIMEOUT);
    let connect_future = client::connect(
        config,
        (settings.host.as_str(), settings.port),
        SshClientHandler,
    );

    let mut handle = tokio::time::timeout(CONNECT_TIMEOUT, connect_future)
        .await
        .map_err(|_| ConnectionError::Timeout {
            target: target.clone(),
            timeout: CONNECT_TIMEOUT,
        })?
        .map_err(|source| ConnectionError::Unreachable {
            target: target.clone(),
            source,
        })?;

    let auth = KeyAuth::new(&settings.key_path);
    let accepted = auth
        .authenticate(&mut handle, &settings.user)
        .await
        .map_err(|message| ConnectionError::Auth {
            target: target.clone(),
            message,
        })?;

    if !accepted {
        return Err(ConnectionError::Auth {
            target,
            message: format!("server rejected key {}", settings.key_path.display()),
        });
    }

    info!("Successfully connected to {}", target);
    Ok(SshSession {
        handle,
        target,
        command_timeout: COMMAND_TIMEOUT,
    })
}

impl SshSession {
    /// Disconnect from the server. Errors are logged, not returned.
    pub async fn close(self) {
        debug!("Closing SSH session to {}", self.target);
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            debug!("Error during disconnect from {}: {}", self.target, e);
        }
    }

    fn channel_error(&self, command: &str, message: String) -> CommandError {
        if self.handle.is_closed() {
            CommandError::SessionClosed {
                command: command.to_string(),
            }
        } else {
            CommandError::Channel {
                command: command.to_string(),
                message,
            }
        }
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn run(&self, command: &str) -> Result<CommandOutput, CommandError> {
        debug!("Executing: {}", command);

        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| self.channel_error(command, format!("Failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| self.channel_error(command, format!("Failed to execute command: {}", e)))?;

        let mut stdout = Vec::with_capacity(4096);
        let mut stderr = Vec::with_capacity(1024);
        let mut exit_code: Option<u32> = None;

        let collected = tokio::time::timeout(self.command_timeout, async {
            loop {
                match channel.wait().await {
                    Some(ChannelMsg::Data { data }) => {
                        stdout.extend_from_slice(&data);
                    }
                    Some(ChannelMsg::ExtendedData { data, ext }) => {
                        // ext == 1 is stderr in SSH protocol
                        if ext == 1 {
                            stderr.extend_from_slice(&data);
                        }
                    }
                    Some(ChannelMsg::ExitStatus { exit_status }) => {
                        exit_code = Some(exit_status);
                    }
                    Some(ChannelMsg::Eof) => {
                        // Exit status may still follow EOF
                        if exit_code.is_some() {
                            break;
                        }
                    }
                    Some(ChannelMsg::Close) | None => break,
                    Some(_) => {}
                }
            }
        })
        .await;

        let _ = channel.close().await;

        if collected.is_err() {
            warn!(
                "Command timed out after {:?} ({} bytes stdout, {} bytes stderr): {}",
                self.command_timeout,
                stdout.len(),
                stderr.len(),
                command
            );
            return Err(CommandError::TimedOut {
                command: command.to_string(),
                timeout: self.command_timeout,
            });
        }

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: exit_code.map(|c| c as i32).unwrap_or(-1),
        };
        debug!(
            "`{}` exited with {} ({} bytes stdout)",
            command,
            output.exit_code,
            output.stdout.len()
        );
        Ok(output)
    }
}
