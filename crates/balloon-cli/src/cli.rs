//! CLI argument definitions for the schema tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "balloon-schema",
    version,
    about = "Inspect and maintain balloon communication schema directories",
    long_about = "Inspect and maintain balloon communication schema directories.\n\n\
                  A schema directory holds the units, constants, data types, configuration\n\
                  items, telecommands and telemetry types shared by the balloon and the\n\
                  ground station. Directory arguments default to $BALLOON_SCHEMA_DIR."
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
    /// Load a schema, check every reference and summarize its contents.
    Check(CheckArgs),

    /// Load a schema and save it back in canonical form.
    Normalize(NormalizeArgs),

    /// List the differences between two schemas.
    Diff(DiffArgs),

    /// List the types of a schema with their display names and kinds.
    Show(ShowArgs),
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Schema directory.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Schema directory.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Write the normalized schema here instead of replacing DIR.
    #[arg(long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DiffArgs {
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Schema directory.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Include the types derived from configurations, telecommands and telemetry types.
    #[arg(long)]
    pub all: bool,
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
