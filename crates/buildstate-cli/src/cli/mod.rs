//! CLI command definitions for the `buildstate` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod config;
pub mod simulate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect and exercise the tool build state registry.
#[derive(Parser)]
#[command(name = "buildstate", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the registry config file.
    #[arg(long, global = true, env = "BUILDSTATE_CONFIG", default_value = "buildstate.toml")]
    pub config: PathBuf,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive concurrent simulated tutoring sessions against a fresh registry
    /// and report the resulting statistics.
    Simulate {
        /// Number of concurrent sessions.
        #[arg(long, default_value_t = 4)]
        sessions: usize,

        /// Builds created per session.
        #[arg(long, default_value_t = 5)]
        builds: usize,

        /// Streamed chunks per build.
        #[arg(long, default_value_t = 10)]
        chunks: usize,
    },

    /// Print the effective registry configuration.
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::parse_from(["buildstate", "simulate"]);
        match cli.command {
            Commands::Simulate {
                sessions,
                builds,
                chunks,
            } => {
                assert_eq!(sessions, 4);
                assert_eq!(builds, 5);
                assert_eq!(chunks, 10);
            }
            Commands::Config => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["buildstate", "config", "--json", "-vv", "--config", "x.toml"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }
}
