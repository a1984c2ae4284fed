//! `pomedos`: age-standardized mortality series from the command line.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use pomedos_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    load_session, run_breakdown, run_causes, run_explain, run_series, run_shares,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "command failed");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let session = load_session(cli.data_dir.as_deref(), cli.config.as_deref())?;
    match &cli.command {
        Command::Causes => run_causes(&session),
        Command::Breakdown(args) => run_breakdown(&session, args),
        Command::Series(args) => run_series(&session, args),
        Command::Explain(args) => run_explain(&session, args),
        Command::Shares(args) => run_shares(&session, args),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    let mut config = LogConfig::default()
        .with_level(level)
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_ansi(ansi);
    // Explicit flags win over RUST_LOG.
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config
}
