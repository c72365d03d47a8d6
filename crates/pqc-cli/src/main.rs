//! ProjectQC snapshot pipeline CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ColorChoice, Parser};
use pqc_cli::config::Settings;
use pqc_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{derive_project_ids, reconcile_once, run_pipeline, sweep_once};
use crate::summary::{print_batch_report, print_project_ids, print_runtime_report, print_sweep_report};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected subcommand; `Ok(false)` means it finished with failures.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    if let Command::ProjectId(args) = &cli.command {
        let results = derive_project_ids(&args.samples);
        print_project_ids(&results);
        return Ok(results.iter().all(|(_, result)| result.is_ok()));
    }

    let settings = Settings::discover(cli.config.as_deref())?;
    match &cli.command {
        Command::Run(args) => {
            let report = run_pipeline(&settings, args.run_for.map(Duration::from_secs))?;
            print_runtime_report(&report);
            Ok(report.coordinator.failed == 0)
        }
        Command::Reconcile(args) => {
            let report = reconcile_once(&settings, args.no_sync)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_batch_report(&report);
            }
            Ok(!report.has_failures())
        }
        Command::Sweep => {
            let report = sweep_once(&settings)?;
            print_sweep_report(&report);
            Ok(report.failed.is_empty())
        }
        Command::ProjectId(_) => Ok(true),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
