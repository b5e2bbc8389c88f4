//! Balloon schema CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use balloon_cli::commands::{resolve_schema_dir, run_check, run_diff, run_normalize, run_show};
use balloon_cli::logging::{LogConfig, LogFormat, init_logging};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_check, print_differences, print_types};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli.command) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Run one subcommand and return its exit code.
fn run(command: Command) -> Result<i32> {
    match command {
        Command::Check(args) => {
            let dir = resolve_schema_dir(args.dir.as_deref())?;
            let report = run_check(&dir)?;
            if args.json {
                let text =
                    serde_json::to_string_pretty(&report).context("serialize check report")?;
                println!("{text}");
            } else {
                print_check(&report);
            }
            Ok(0)
        }
        Command::Normalize(args) => {
            let dir = resolve_schema_dir(args.dir.as_deref())?;
            let target = run_normalize(&dir, args.output.as_deref())?;
            println!("Saved {}", target.display());
            Ok(0)
        }
        Command::Diff(args) => {
            let differences = run_diff(&args.left, &args.right)?;
            print_differences(&differences);
            Ok(if differences.is_empty() { 0 } else { 1 })
        }
        Command::Show(args) => {
            let dir = resolve_schema_dir(args.dir.as_deref())?;
            print_types(&run_show(&dir, args.all)?);
            Ok(0)
        }
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
