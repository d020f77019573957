//! Command-line interface definitions for the companion service.
//!
//! This module contains the CLI argument parsing structures and enums
//! used by the shim binary and the integration tests.

use std::{env, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

/// Top-level command-line interface definition.
#[derive(Debug, Parser)]
#[command(name = "pomodoro_companion")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the companion service (room sync and hosts blocking API).
    Serve(ServiceArgs),
}

/// Arguments for the serve command.
#[derive(Debug, Parser)]
pub struct ServiceArgs {
    /// Optional path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "POMODORO_COMPANION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Optional override for the listen port (overrides port in config)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Optional override for the bind address (overrides bind in config)
    #[arg(long)]
    pub bind: Option<String>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
    Pretty,
}
