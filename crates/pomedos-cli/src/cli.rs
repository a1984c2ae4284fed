//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use pomedos_cli::output::OutputFormat;
use pomedos_engine::SexSelection;

#[derive(Parser)]
#[command(
    name = "pomedos",
    version,
    about = "Age-standardized mortality series for Germany",
    long_about = "Compute yearly death counts and age-standardized death rates \
                  (direct standardization against the European Standard Population 2013) \
                  from cause-of-death and population-by-age tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the source tables (default: $POMEDOS_DATA_DIR, else ./Data).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (default: <DATA_DIR>/pomedos.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

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
    /// List the causes of death in source order.
    Causes,

    /// Deaths by age bracket and sex for a set of causes.
    Breakdown(BreakdownArgs),

    /// Yearly deaths, raw or age-standardized.
    Series(SeriesArgs),

    /// Per-bracket detail of one year's standardized rate.
    Explain(ExplainArgs),

    /// Share of each bracket within a bracket group, per year.
    Shares(SharesArgs),
}

#[derive(Args)]
pub struct BreakdownArgs {
    /// Cause of death (repeat to sum several causes).
    #[arg(long = "cause", value_name = "CAUSE", required = true)]
    pub causes: Vec<String>,

    /// Year to include (repeatable; default: all years).
    #[arg(long = "year", value_name = "YEAR", conflicts_with = "all_years")]
    pub years: Vec<i32>,

    /// Sum over every loaded year.
    #[arg(long = "all-years")]
    pub all_years: bool,

    /// Print one male/female/total row per year instead of per bracket.
    #[arg(long = "per-year")]
    pub per_year: bool,
}

#[derive(Args)]
pub struct SeriesArgs {
    /// First year (default: first loaded year).
    #[arg(long = "start", value_name = "YEAR")]
    pub start: Option<i32>,

    /// Last year, inclusive (default: last loaded year).
    #[arg(long = "end", value_name = "YEAR")]
    pub end: Option<i32>,

    /// Cause of death (repeatable; default: the all-cause rows).
    #[arg(long = "cause", value_name = "CAUSE")]
    pub causes: Vec<String>,

    /// Age-standardize against the standard population.
    #[arg(long = "standardize")]
    pub standardize: bool,

    /// Skip years with missing data instead of failing.
    #[arg(long = "skip-missing")]
    pub skip_missing: bool,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Write the series to a file instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Year to explain.
    #[arg(long = "year", value_name = "YEAR")]
    pub year: i32,

    /// Cause of death (repeatable; default: the all-cause rows).
    #[arg(long = "cause", value_name = "CAUSE")]
    pub causes: Vec<String>,
}

#[derive(Args)]
pub struct SharesArgs {
    /// Cause of death (default: the all-cause rows).
    #[arg(long = "cause", value_name = "CAUSE")]
    pub cause: Option<String>,

    /// Bracket label of the group (repeat for each bracket).
    #[arg(long = "bracket", value_name = "LABEL", required = true)]
    pub brackets: Vec<String>,

    /// Deaths the shares are computed over.
    #[arg(long = "sex", value_enum, default_value = "total")]
    pub sex: SexArg,

    /// First year (default: first loaded year).
    #[arg(long = "start", value_name = "YEAR")]
    pub start: Option<i32>,

    /// Last year, inclusive (default: last loaded year).
    #[arg(long = "end", value_name = "YEAR")]
    pub end: Option<i32>,

    /// Average the shares over the last N years.
    #[arg(long = "mean-last", value_name = "N", default_value_t = 3)]
    pub mean_last: usize,

    /// Split this many deaths across the group by the mean shares.
    #[arg(long = "project", value_name = "TOTAL")]
    pub project: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Csv,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Csv => OutputFormat::Csv,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SexArg {
    Male,
    Female,
    Total,
}

impl From<SexArg> for SexSelection {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Male => SexSelection::Male,
            SexArg::Female => SexSelection::Female,
            SexArg::Total => SexSelection::Total,
        }
    }
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
