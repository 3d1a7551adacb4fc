//! Command line flags.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_CONFIG_FILE, SettingsLayer};

#[derive(Parser, Debug)]
#[command(
    name = "aws-ssh",
    version,
    about = "Connect to an AWS instance via SSH and summarize remote directories",
    after_help = "Configuration priority (highest to lowest):\n  1. Command line arguments\n  2. Config file variables\n  3. Interactive prompts (host and key) or built-in defaults\n\nConfig file variables:\n  AWS_SSH_HOST         AWS instance hostname/IP\n  AWS_SSH_USER         SSH username (default: forge)\n  AWS_SSH_KEY          Path to SSH private key\n  AWS_SSH_PORT         SSH port (default: 22)\n  AWS_SSH_DIRECTORIES  Comma-separated directories to list (default: /home/<user>,/var/log,/opt)\n\nExamples:\n  aws-ssh                      Use .env file + prompts\n  aws-ssh --key ~/.ssh/key     Override the SSH key from .env\n  aws-ssh --verbose            Enable debug logging\n  aws-ssh --system-info --root --docker --resources\n                               Print every optional section"
)]
pub struct Cli {
    #[arg(short = 'H', long, help = "Override AWS instance hostname/IP from the config file")]
    pub host: Option<String>,

    #[arg(short, long, help = "Override SSH username from the config file")]
    pub user: Option<String>,

    #[arg(short, long, help = "Override SSH private key path from the config file")]
    pub key: Option<String>,

    #[arg(short, long, help = "Override SSH port from the config file")]
    pub port: Option<String>,

    #[arg(
        short,
        long,
        help = "Override directories to list (comma-separated) from the config file"
    )]
    pub directories: Option<String>,

    #[arg(
        short,
        long,
        default_value = DEFAULT_CONFIG_FILE,
        help = "Config file with KEY=value lines"
    )]
    pub config: PathBuf,

    #[arg(long, help = "Write the resolved settings back to the config file")]
    pub save: bool,

    #[arg(long, help = "Never prompt; fail if a required setting is missing")]
    pub no_input: bool,

    #[arg(long, help = "Also print hostname, uptime, disk, memory and CPU information")]
    pub system_info: bool,

    #[arg(long, help = "Also print the first entries of the root directory")]
    pub root: bool,

    #[arg(long, help = "Also print running Docker containers")]
    pub docker: bool,

    #[arg(long, help = "Also print disk, memory, load and top process snapshots")]
    pub resources: bool,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,
}

impl Cli {
    /// The command line layer of the settings.
    pub fn overrides(&self) -> SettingsLayer {
        SettingsLayer {
            host: self.host.clone(),
            user: self.user.clone(),
            key: self.key.clone(),
            port: self.port.clone(),
            directories: self.directories.clone(),
        }
    }
}
