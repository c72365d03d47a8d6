//! CLI argument definitions for `pqc`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pqc",
    version,
    about = "ProjectQC snapshot pipeline - keep per-project QC tables in sync",
    long_about = "Mirror the instrument QC and sample metadata databases into local working\n\
                  copies and maintain one CSV snapshot per active project.\n\n\
                  Settings are read from a TOML file (default: pqc.toml)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Settings file (default: pqc.toml when present).
    #[arg(long = "config", short = 'c', value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Watch both databases and keep snapshots current until stopped.
    Run(RunArgs),

    /// Sync the working copies once and reconcile every active project.
    Reconcile(ReconcileArgs),

    /// Delete snapshots of projects that left the monitoring window.
    Sweep,

    /// Show the project id and match patterns derived from sample names.
    ProjectId(ProjectIdArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Stop after this many seconds instead of running until killed.
    #[arg(long = "run-for", value_name = "SECS")]
    pub run_for: Option<u64>,
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// Use the existing working copies without syncing first.
    #[arg(long = "no-sync")]
    pub no_sync: bool,

    /// Print the per-project report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ProjectIdArgs {
    /// Sample names, with or without the `.raw` extension.
    #[arg(value_name = "SAMPLE", required = true)]
    pub samples: Vec<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pqc",
            "run",
            "--run-for",
            "30",
            "--config",
            "/etc/pqc.toml",
            "--log-format",
            "json",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.run_for, Some(30));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/pqc.toml")));
        assert!(matches!(cli.log_format, LogFormatArg::Json));
    }

    #[test]
    fn test_reconcile_flags() {
        let cli = Cli::try_parse_from(["pqc", "reconcile", "--no-sync", "--json"]).unwrap();
        let Command::Reconcile(args) = cli.command else {
            panic!("expected reconcile");
        };
        assert!(args.no_sync);
        assert!(args.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_project_id_requires_a_sample() {
        assert!(Cli::try_parse_from(["pqc", "project-id"]).is_err());
        let cli = Cli::try_parse_from(["pqc", "project-id", "A_20250101_X_1", "B"]).unwrap();
        let Command::ProjectId(args) = cli.command else {
            panic!("expected project-id");
        };
        assert_eq!(args.samples, ["A_20250101_X_1", "B"]);
    }
}
