//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use waitlist_cli::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "waitlist",
    version,
    about = "Reconcile transplant waitlist registrations into waitlist episodes",
    long_about = "Reconcile a patient registry's waitlist registrations into one record\n\
                  per distinct waitlist episode per patient, with wait time, outcome\n\
                  and list type, plus a JSON run report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
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

    /// Include patient and registration identifiers in log events.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile a registry CSV and write the canonical records.
    Reconcile(ReconcileArgs),

    /// List the registry fields and the column names recognized for each.
    Columns,
}

#[derive(Parser)]
pub struct ReconcileArgs {
    /// Registry CSV with one row per waitlist registration.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Configuration file (default: $WAITLIST_CONFIG when set).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output directory (default: <INPUT directory>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Reconcile and report without writing files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Replace identifiers in the outputs with keyed hashes of this seed.
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<String>,

    /// Keep only registrations for this organ code.
    #[arg(long = "organ", value_name = "CODE")]
    pub organ: Option<String>,

    /// Keep only registrations listed at this age or older.
    #[arg(long = "min-age", value_name = "YEARS")]
    pub min_age: Option<f64>,

    /// Keep only registrations listed on or after this date (YYYY-MM-DD).
    #[arg(long = "listed-from", value_name = "DATE")]
    pub listed_from: Option<NaiveDate>,

    /// Keep only registrations listed on or before this date (YYYY-MM-DD).
    #[arg(long = "listed-to", value_name = "DATE")]
    pub listed_to: Option<NaiveDate>,
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

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
