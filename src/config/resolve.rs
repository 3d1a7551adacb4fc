//! Field-by-field resolution of [`Settings`] across source layers.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{
    Defaults, HOST_KEY, InputSource, KEY_PATH_KEY, Settings, SettingsLayer, detect_key,
    expand_home, parse_port, split_directories,
};
use crate::error::ConfigError;

/// Merges the command line and persisted layers, prompting for what is
/// still missing.
pub struct Resolver<'a> {
    defaults: &'a Defaults,
    input: &'a mut dyn InputSource,
    exists: Box<dyn Fn(&Path) -> bool + 'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(defaults: &'a Defaults, input: &'a mut dyn InputSource) -> Self {
        Self {
            defaults,
            input,
            exists: Box::new(Path::exists),
        }
    }

    /// Replace the filesystem check used for key auto-detection.
    pub fn with_exists(mut self, exists: impl Fn(&Path) -> bool + 'a) -> Self {
        self.exists = Box::new(exists);
        self
    }

    /// Resolve every field with priority: command line -> config file ->
    /// prompt (required fields) or default (optional fields).
    pub fn resolve(
        &mut self,
        overrides: &SettingsLayer,
        persisted: &SettingsLayer,
    ) -> Result<Settings, ConfigError> {
        let port = match pick(&overrides.port, &persisted.port) {
            Some(raw) => parse_port(raw)?,
            None => self.defaults.port,
        };

        let user = pick(&overrides.user, &persisted.user)
            .map(str::to_string)
            .unwrap_or_else(|| self.defaults.user.clone());

        let directories = pick(&overrides.directories, &persisted.directories)
            .map(split_directories)
            .filter(|dirs| !dirs.is_empty())
            .unwrap_or_else(|| self.defaults.directories_for(&user));

        let host = match pick(&overrides.host, &persisted.host) {
            Some(host) => host.to_string(),
            None => {
                warn!("{} not found in config file", HOST_KEY);
                self.prompt_required("host", HOST_KEY, "host", "Enter AWS hostname/IP address: ")?
            }
        };

        let key_path = match pick(&overrides.key, &persisted.key) {
            Some(raw) => expand_home(raw),
            None => {
                warn!("{} not found in config file", KEY_PATH_KEY);
                self.fallback_key()?
            }
        };
        validate_key_path(&key_path)?;

        debug!(
            "Resolved settings: {}@{}:{} key={} directories={:?}",
            user,
            host,
            port,
            key_path.display(),
            directories
        );

        Ok(Settings {
            host,
            user,
            key_path,
            port,
            directories,
        })
    }

    /// Auto-detect a conventional key, falling back to a prompt.
    fn fallback_key(&mut self) -> Result<PathBuf, ConfigError> {
        let candidates: Vec<PathBuf> = self
            .defaults
            .key_candidates
            .iter()
            .map(|candidate| expand_home(candidate))
            .collect();

        if let Some(found) = detect_key(candidates.as_slice(), &self.exists) {
            if !self.input.is_interactive() {
                info!("Using detected SSH key {}", found.display());
                return Ok(found);
            }

            let answer = self.input.prompt(&format!(
                "Found SSH key at {}. Use this key? [Y/n]: ",
                found.display()
            ))?;
            if matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes") {
                return Ok(found);
            }
        }

        let raw =
            self.prompt_required("key_path", KEY_PATH_KEY, "key", "Enter path to SSH private key: ")?;
        Ok(expand_home(&raw))
    }

    fn prompt_required(
        &mut self,
        field: &'static str,
        key: &'static str,
        flag: &'static str,
        message: &str,
    ) -> Result<String, ConfigError> {
        let missing = ConfigError::MissingRequiredField { field, key, flag };

        if !self.input.is_interactive() {
            return Err(missing);
        }

        let answer = self.input.prompt(message)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(missing);
        }
        Ok(answer.to_string())
    }
}

/// First non-blank value, command line before config file.
fn pick<'v>(first: &'v Option<String>, second: &'v Option<String>) -> Option<&'v str> {
    [first, second]
        .into_iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

/// The key must be an existing, readable regular file.
fn validate_key_path(path: &Path) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidKeyPath {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = fs::metadata(path).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_file() {
        return Err(invalid("not a regular file".to_string()));
    }
    File::open(path).map_err(|e| invalid(format!("not readable: {e}")))?;
    Ok(())
}
