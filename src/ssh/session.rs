//! russh client handler.

use russh::{client, keys};
use tracing::debug;

/// Client handler that accepts all host keys.
///
/// Equivalent to `StrictHostKeyChecking=no` in OpenSSH. Host key trust is
/// left to the operator.
pub struct SshClientHandler;

impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!(
            "Accepting server host key ({})",
            server_public_key.algorithm().as_str()
        );
        Ok(true)
    }
}
