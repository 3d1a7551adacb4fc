#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use std::process::ExitCode;

use aws_ssh::{Cli, app};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(cli.verbose, std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    match app::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// `RUST_LOG` when set and valid, otherwise `info` for this crate.
/// `--verbose` always raises this crate to `debug`.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("aws_ssh=info"));

    if verbose {
        filter.add_directive("aws_ssh=debug".parse().expect("valid directive"))
    } else {
        filter
    }
}
