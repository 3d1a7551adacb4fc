//! Reading and writing the persisted `KEY=value` config file.
//!
//! The file is parsed with `dotenv`'s iterator API so its values never reach
//! the process environment.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::config::{
    DIRECTORIES_KEY, DIRECTORY_DELIMITER, HOST_KEY, KEY_PATH_KEY, PORT_KEY, Settings,
    SettingsLayer, USER_KEY,
};
use crate::error::ConfigError;

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = ".env";

/// Load the persisted layer from `path`.
///
/// A missing file is an empty layer. A file that exists but cannot be parsed
/// is an error.
pub fn load_layer(path: &Path) -> Result<SettingsLayer, ConfigError> {
    if !path.exists() {
        debug!("Config file {} not found, skipping", path.display());
        return Ok(SettingsLayer::default());
    }

    let config_error = |message: String| ConfigError::ConfigFile {
        path: path.to_path_buf(),
        message,
    };

    #[allow(deprecated)]
    let entries = dotenv::from_path_iter(path).map_err(|e| config_error(e.to_string()))?;

    let mut layer = SettingsLayer::default();
    for entry in entries {
        let (key, value) = entry.map_err(|e| config_error(e.to_string()))?;
        layer.set(&key, value);
    }

    debug!("Loaded config file {}", path.display());
    Ok(layer)
}

/// Write `settings` to `path`.
///
/// Lines for recognized keys are replaced in place and missing keys are
/// appended; every other line is kept as it was.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let save_error = |source: io::Error| ConfigError::SaveConfig {
        path: path.to_path_buf(),
        source,
    };

    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(save_error(e)),
    };

    fs::write(path, render(&existing, settings)).map_err(save_error)?;
    debug!("Saved settings for {} to {}", settings.target(), path.display());
    Ok(())
}

fn render(existing: &str, settings: &Settings) -> String {
    let directories = settings.directories.join(&DIRECTORY_DELIMITER.to_string());
    let mut pending: Vec<(&str, String)> = vec![
        (HOST_KEY, settings.host.clone()),
        (USER_KEY, settings.user.clone()),
        (KEY_PATH_KEY, settings.key_path.display().to_string()),
        (PORT_KEY, settings.port.to_string()),
        (DIRECTORIES_KEY, directories),
    ];

    let mut lines = Vec::new();
    for line in existing.lines() {
        match line_key(line).and_then(|key| pending.iter().position(|(k, _)| *k == key)) {
            Some(index) => {
                let (key, value) = pending.remove(index);
                lines.push(format!("{key}={}", quote(&value)));
            }
            None => lines.push(line.to_string()),
        }
    }
    for (key, value) in pending {
        lines.push(format!("{key}={}", quote(&value)));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Key of an assignment line, if it is one.
fn line_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    line.split_once('=').map(|(key, _)| key.trim())
}

fn quote(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/._-,:@~+".contains(c));
    if plain {
        value.to_string()
    } else if !value.contains('\'') {
        format!("'{value}'")
    } else {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$");
        format!("\"{escaped}\"")
    }
}
