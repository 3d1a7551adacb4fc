//! Invocation driver: resolve settings, connect, survey, report.

use std::io::{self, Write};

use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::config::{self, Defaults, InputSource, NoInput, Resolver, Settings, TerminalInput};
use crate::error::{AppError, CommandError, ConfigError};
use crate::listing::{listing_command, parse_listing};
use crate::report::Presenter;
use crate::ssh::{self, CommandOutput, RemoteSession};

/// System facts gathered with `--system-info`, in display order.
pub const SYSTEM_INFO_COMMANDS: &[(&str, &str)] = &[
    ("hostname", "hostname"),
    ("uptime", "uptime"),
    ("disk_usage", "df -h /"),
    ("memory", "free -h"),
    ("cpu_info", "lscpu | head -10"),
    ("current_dir", "pwd"),
    ("user", "whoami"),
];

/// Lists running containers, or echoes a marker when Docker is missing.
pub const DOCKER_COMMAND: &str = "docker ps 2>/dev/null || echo 'Docker not available'";

/// Header line `docker ps` prints when the daemon answered.
const DOCKER_HEADER: &str = "CONTAINER ID";

/// Resource snapshot commands, in display order.
pub const RESOURCE_COMMANDS: &[(&str, &str)] = &[
    ("Disk Usage", "df -h / 2>/dev/null | tail -1"),
    ("Memory Usage", "free -h 2>/dev/null | grep Mem"),
    ("Load Average", "uptime 2>/dev/null | cut -d',' -f3-"),
    (
        "Running Processes",
        "ps aux --sort=-%cpu | head -5 2>/dev/null || ps aux | head -5",
    ),
];

const ROOT_DIRECTORY: &str = "/";

/// What to run once connected.
///
/// Sections run in this order: system info, root listing, configured
/// directories, Docker containers, resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurveyOptions {
    pub system_info: bool,
    pub root_listing: bool,
    pub docker: bool,
    pub resources: bool,
}

impl SurveyOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            system_info: cli.system_info,
            root_listing: cli.root,
            docker: cli.docker,
            resources: cli.resources,
        }
    }
}

/// Counts from one survey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurveyReport {
    pub commands: usize,
    pub failed: usize,
}

/// Run one invocation end to end.
pub async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = resolve_settings(&cli)?;

    if cli.save {
        config::save_settings(&cli.config, &settings)?;
        info!("Saved settings to {}", cli.config.display());
    }

    let stdout = io::stdout();
    let mut presenter = Presenter::new(stdout.lock());
    presenter.header(&settings)?;

    let session = ssh::connect(&settings).await?;
    let options = SurveyOptions::from_cli(&cli);
    let outcome = survey(&session, &settings, options, &mut presenter).await;
    session.close().await;

    let report = outcome?;
    if report.failed > 0 {
        return Err(AppError::Commands {
            failed: report.failed,
            total: report.commands,
        });
    }
    info!("Completed {} command(s) on {}", report.commands, settings.target());
    Ok(())
}

/// Resolve settings from the command line, the config file and the terminal.
pub fn resolve_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let defaults = Defaults::default();
    let persisted = config::load_layer(&cli.config)?;

    let mut input: Box<dyn InputSource> = if cli.no_input {
        Box::new(NoInput)
    } else {
        Box::new(TerminalInput)
    };

    Resolver::new(&defaults, input.as_mut()).resolve(&cli.overrides(), &persisted)
}

/// Run the configured commands on `session` in order, presenting each result.
///
/// A failed command is reported and the survey moves on; only a dropped
/// session stops it early. Docker and resource probes have their own
/// fallback output, so only transport errors count against them.
pub async fn survey<S, W>(
    session: &S,
    settings: &Settings,
    options: SurveyOptions,
    presenter: &mut Presenter<W>,
) -> Result<SurveyReport, AppError>
where
    S: RemoteSession + ?Sized,
    W: Write,
{
    let mut report = SurveyReport::default();

    if options.system_info {
        presenter.section("System Information")?;
        for (label, command) in SYSTEM_INFO_COMMANDS {
            report.commands += 1;
            match run_checked(session, command).await {
                Ok(stdout) => presenter.system_fact(label, Ok(&stdout))?,
                Err(e) => {
                    report.failed += 1;
                    presenter.system_fact(label, Err(&e))?;
                    abort_if_fatal(e)?;
                }
            }
        }
    }

    if options.root_listing {
        report.commands += 1;
        match run_checked(session, &listing_command(ROOT_DIRECTORY)).await {
            Ok(stdout) => presenter.root_listing(&parse_listing(&stdout))?,
            Err(e) => {
                report.failed += 1;
                warn!("Failed to list root directory: {}", e);
                presenter.root_listing_error(&e)?;
                abort_if_fatal(e)?;
            }
        }
    }

    for dir in &settings.directories {
        report.commands += 1;
        let command = listing_command(dir);
        match run_checked(session, &command).await {
            Ok(stdout) => presenter.directory(dir, &parse_listing(&stdout))?,
            Err(e) => {
                report.failed += 1;
                warn!("Failed to list directory {}: {}", dir, e);
                presenter.directory_error(dir, &e)?;
                abort_if_fatal(e)?;
            }
        }
    }

    if options.docker {
        report.commands += 1;
        match session.run(DOCKER_COMMAND).await {
            Ok(output) => presenter.docker(docker_containers(&output))?,
            Err(e) => {
                report.failed += 1;
                warn!("Failed to query Docker: {}", e);
                presenter.docker(None)?;
                abort_if_fatal(e)?;
            }
        }
    }

    if options.resources {
        presenter.section("System Resources")?;
        for (label, command) in RESOURCE_COMMANDS {
            report.commands += 1;
            match session.run(command).await {
                Ok(output) => presenter.resource(label, resource_value(&output))?,
                Err(e) => {
                    report.failed += 1;
                    warn!("Failed to read {}: {}", label, e);
                    presenter.resource(label, None)?;
                    abort_if_fatal(e)?;
                }
            }
        }
    }

    Ok(report)
}

/// `docker ps` output when the daemon answered with a container table.
fn docker_containers(output: &CommandOutput) -> Option<&str> {
    (output.success() && output.stdout.contains(DOCKER_HEADER)).then_some(output.stdout.as_str())
}

/// Trimmed stdout of a successful resource command, if it printed anything.
fn resource_value(output: &CommandOutput) -> Option<&str> {
    let value = output.stdout.trim();
    (output.success() && !value.is_empty()).then_some(value)
}

async fn run_checked<S>(session: &S, command: &str) -> Result<String, CommandError>
where
    S: RemoteSession + ?Sized,
{
    let output = session.run(command).await?.into_result(command)?;
    Ok(output.stdout)
}

fn abort_if_fatal(e: CommandError) -> Result<(), CommandError> {
    if e.is_fatal() {
        error!("SSH session dropped; skipping remaining commands");
        return Err(e);
    }
    Ok(())
}
