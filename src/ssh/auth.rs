//! Private key file SSH authentication.

use std::path::PathBuf;
use std::sync::Arc;

use russh::{client, keys};
use tracing::debug;

use crate::ssh::SshClientHandler;

/// Public key authentication with a key loaded from disk.
///
/// Only passphrase-less keys are supported.
pub struct KeyAuth {
    key_path: PathBuf,
}

impl KeyAuth {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }

    #[cfg(test)]
    fn key_path(&self) -> &std::path::Path {
        &self.key_path
    }

    /// Authenticate `username` on `handle`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The server accepted the key
    /// * `Ok(false)` - The server rejected the key
    /// * `Err(message)` - The key could not be loaded or the exchange failed
    pub async fn authenticate(
        &self,
        handle: &mut client::Handle<SshClientHandler>,
        username: &str,
    ) -> Result<bool, String> {
        let key_pair = keys::load_secret_key(&self.key_path, None).map_err(|e| {
            format!(
                "Failed to load private key from {}: {}",
                self.key_path.display(),
                e
            )
        })?;

        // RSA keys need the server's preferred signature hash
        let hash_alg = handle
            .best_supported_rsa_hash()
            .await
            .ok()
            .flatten()
            .flatten();
        debug!("Using RSA hash algorithm for key auth: {:?}", hash_alg);

        let key_with_hash = keys::PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg);

        let result = handle
            .authenticate_publickey(username, key_with_hash)
            .await
            .map_err(|e| format!("Key authentication failed: {}", e))?;

        Ok(result.success())
    }
}
