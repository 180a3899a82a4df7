use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use oracle_cli::cli::Cli;
use oracle_cli::exit::ExitStatus;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let status = tokio::select! {
        result = oracle_cli::run(cli) => match result {
            Ok(status) => status,
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                ExitStatus::for_error(&e)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            // The store is only written after a verdict, never mid-consultation
            eprintln!("\n{}", "Interrupted before the oracle answered. Nothing was recorded.".yellow());
            ExitStatus::Interrupted
        }
    };

    status.into()
}

/// `--log-level` wins, then `--verbose`, then `RUST_LOG`, then `warn`.
/// Logs go to stderr so verdict output on stdout stays clean.
fn init_logging(cli: &Cli) {
    let filter = match (cli.log_level, cli.verbose) {
        (Some(level), _) => EnvFilter::default().add_directive(LevelFilter::from(level).into()),
        (None, true) => EnvFilter::new("debug"),
        (None, false) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
