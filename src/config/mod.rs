//! Connection settings and their layered resolution.
//!
//! Settings come from three layers, highest priority first:
//!
//! 1. **Command line** - flags such as `--host` and `--key`
//! 2. **Config file** - `KEY=value` lines, `.env` by default
//! 3. **Interactive prompt / default** - required fields are prompted for,
//!    optional fields fall back to [`Defaults`]
//!
//! # Config Keys
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `AWS_SSH_HOST` | (prompt) | Instance hostname or IP |
//! | `AWS_SSH_USER` | `forge` | SSH username |
//! | `AWS_SSH_KEY` | (auto-detect, prompt) | Path to the private key |
//! | `AWS_SSH_PORT` | `22` | SSH port |
//! | `AWS_SSH_DIRECTORIES` | `/home/<user>,/var/log,/opt` | Comma-separated directories to list |

mod file;
mod keys;
mod prompt;
mod resolve;

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ConfigError;

pub use file::{DEFAULT_CONFIG_FILE, load_layer, save_settings};
pub use keys::{DEFAULT_KEY_CANDIDATES, detect_key, expand_home};
pub use prompt::{InputSource, NoInput, TerminalInput};
pub use resolve::Resolver;

/// Config key for the instance hostname or IP
pub const HOST_KEY: &str = "AWS_SSH_HOST";

/// Config key for the SSH username
pub const USER_KEY: &str = "AWS_SSH_USER";

/// Config key for the private key path
pub const KEY_PATH_KEY: &str = "AWS_SSH_KEY";

/// Config key for the SSH port
pub const PORT_KEY: &str = "AWS_SSH_PORT";

/// Config key for the comma-separated directory list
pub const DIRECTORIES_KEY: &str = "AWS_SSH_DIRECTORIES";

/// Default SSH username
pub const DEFAULT_USER: &str = "forge";

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Directories listed after the user's home directory by default
pub const DEFAULT_SHARED_DIRECTORIES: &[&str] = &["/var/log", "/opt"];

/// Separator for directory lists given as a single string
pub const DIRECTORY_DELIMITER: char = ',';

/// Fully resolved connection settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub user: String,
    pub key_path: PathBuf,
    pub port: u16,
    pub directories: Vec<String>,
}

impl Settings {
    /// `user@host:port`, used in log lines and error messages.
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target())
    }
}

/// One partial source of settings.
///
/// Values are kept as the raw text they arrived as; parsing and validation
/// happen in [`Resolver`] so every layer is checked the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsLayer {
    pub host: Option<String>,
    pub user: Option<String>,
    pub key: Option<String>,
    pub port: Option<String>,
    pub directories: Option<String>,
}

impl SettingsLayer {
    /// Store `value` under a config key. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let slot = match key {
            HOST_KEY => &mut self.host,
            USER_KEY => &mut self.user,
            KEY_PATH_KEY => &mut self.key,
            PORT_KEY => &mut self.port,
            DIRECTORIES_KEY => &mut self.directories,
            _ => {
                debug!("Ignoring unknown config key {}", key);
                return false;
            }
        };
        *slot = Some(value.into());
        true
    }
}

/// Hard-coded fallbacks, built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub user: String,
    pub port: u16,
    /// Listed after `/home/<user>` when no directories are configured.
    pub shared_directories: Vec<String>,
    /// Key files tried in order when no key is configured.
    pub key_candidates: Vec<String>,
}

impl Defaults {
    /// Default directory list for `user`.
    pub fn directories_for(&self, user: &str) -> Vec<String> {
        std::iter::once(format!("/home/{user}"))
            .chain(self.shared_directories.iter().cloned())
            .collect()
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            port: DEFAULT_PORT,
            shared_directories: DEFAULT_SHARED_DIRECTORIES
                .iter()
                .map(|d| d.to_string())
                .collect(),
            key_candidates: DEFAULT_KEY_CANDIDATES
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Parse a port, rejecting anything outside 1-65535.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let invalid = || ConfigError::InvalidPort {
        value: raw.to_string(),
    };
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(port) => Ok(port),
    }
}

/// Split a delimited directory list, trimming each entry and dropping empties.
pub fn split_directories(raw: &str) -> Vec<String> {
    raw.split(DIRECTORY_DELIMITER)
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod port_parsing {
        use super::*;

        #[test]
        fn test_default_equal_port() {
            assert_eq!(parse_port("22").unwrap(), 22);
        }

        #[test]
        fn test_surrounding_whitespace_is_ignored() {
            assert_eq!(parse_port(" 2222 ").unwrap(), 2222);
        }

        #[test]
        fn test_bounds() {
            assert_eq!(parse_port("1").unwrap(), 1);
            assert_eq!(parse_port("65535").unwrap(), 65535);
        }

        #[test]
        fn test_zero_is_rejected() {
            assert!(matches!(
                parse_port("0"),
                Err(ConfigError::InvalidPort { .. })
            ));
        }

        #[test]
        fn test_out_of_range_is_rejected() {
            assert!(matches!(
                parse_port("65536"),
                Err(ConfigError::InvalidPort { .. })
            ));
            assert!(matches!(
                parse_port("-22"),
                Err(ConfigError::InvalidPort { .. })
            ));
        }

        #[test]
        fn test_non_numeric_is_rejected() {
            match parse_port("not-a-number") {
                Err(ConfigError::InvalidPort { value }) => assert_eq!(value, "not-a-number"),
                other => panic!("expected InvalidPort, got {other:?}"),
            }
        }
    }

    mod directory_splitting {
        use super::*;

        #[test]
        fn test_whitespace_is_trimmed() {
            assert_eq!(
                split_directories("/home, /var/log ,/opt"),
                vec!["/home", "/var/log", "/opt"]
            );
        }

        #[test]
        fn test_empty_entries_are_dropped() {
            assert_eq!(split_directories(",/srv,, ,"), vec!["/srv"]);
        }

        #[test]
        fn test_blank_string_is_empty() {
            assert!(split_directories("  ").is_empty());
            assert!(split_directories("").is_empty());
        }

        #[test]
        fn test_single_entry() {
            assert_eq!(split_directories("/data"), vec!["/data"]);
        }
    }

    mod layers {
        use super::*;

        #[test]
        fn test_set_known_keys() {
            let mut layer = SettingsLayer::default();
            assert!(layer.set(HOST_KEY, "10.0.0.1"));
            assert!(layer.set(USER_KEY, "ubuntu"));
            assert!(layer.set(KEY_PATH_KEY, "~/.ssh/aws.pem"));
            assert!(layer.set(PORT_KEY, "2222"));
            assert!(layer.set(DIRECTORIES_KEY, "/srv,/data"));

            assert_eq!(layer.host.as_deref(), Some("10.0.0.1"));
            assert_eq!(layer.user.as_deref(), Some("ubuntu"));
            assert_eq!(layer.key.as_deref(), Some("~/.ssh/aws.pem"));
            assert_eq!(layer.port.as_deref(), Some("2222"));
            assert_eq!(layer.directories.as_deref(), Some("/srv,/data"));
        }

        #[test]
        fn test_unknown_keys_are_ignored() {
            let mut layer = SettingsLayer::default();
            assert!(!layer.set("AWS_REGION", "us-east-1"));
            assert_eq!(layer, SettingsLayer::default());
        }

        #[test]
        fn test_last_value_wins() {
            let mut layer = SettingsLayer::default();
            layer.set(HOST_KEY, "first");
            layer.set(HOST_KEY, "second");
            assert_eq!(layer.host.as_deref(), Some("second"));
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn test_named_defaults() {
            let defaults = Defaults::default();
            assert_eq!(defaults.user, "forge");
            assert_eq!(defaults.port, 22);
            assert_eq!(defaults.key_candidates.len(), DEFAULT_KEY_CANDIDATES.len());
        }

        #[test]
        fn test_default_directories_follow_user() {
            let defaults = Defaults::default();
            assert_eq!(
                defaults.directories_for("forge"),
                vec!["/home/forge", "/var/log", "/opt"]
            );
            assert_eq!(
                defaults.directories_for("ubuntu"),
                vec!["/home/ubuntu", "/var/log", "/opt"]
            );
        }
    }

    #[test]
    fn test_settings_target() {
        let settings = Settings {
            host: "10.0.0.1".to_string(),
            user: "forge".to_string(),
            key_path: PathBuf::from("/keys/aws.pem"),
            port: 2222,
            directories: vec![],
        };
        assert_eq!(settings.target(), "forge@10.0.0.1:2222");
        assert_eq!(settings.to_string(), "forge@10.0.0.1:2222");
    }
}
