//! Goldilock door controller CLI.
//!
//! Resolves Wiegand frames against the configured format catalog and runs
//! the reader-to-relay loop:
//! - `decode`: resolve one frame given as a bit string
//! - `formats`: list the catalog in priority order
//! - `run`: read frames from stdin and drive the door

use anyhow::Result;
use clap::{Parser, Subcommand};
use goldilock_core::constants::DEFAULT_CONFIG_PATH;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Goldilock - Wiegand card reader and door controller
#[derive(Parser, Debug)]
#[command(name = "goldilock")]
#[command(about = "Decode Wiegand frames and control a door lock", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one frame, e.g. `goldilock decode 0_00000111_0001001000110100_0`
    Decode {
        /// Frame bits, first received first; `_` and spaces are ignored
        bits: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the format catalog in priority order
    Formats,

    /// Read frames from stdin, one per line, and drive the door
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = config::resolve_config(args.config.as_deref(), Path::new(DEFAULT_CONFIG_PATH))?;

    match args.command {
        Command::Decode { bits, json } => commands::decode(&config, &bits, json),
        Command::Formats => commands::formats(&config),
        Command::Run => commands::run(&config).await,
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_decode_with_global_flags() {
        let args = Args::parse_from(["goldilock", "decode", "0101", "--json", "-vv"]);
        assert_eq!(args.verbose, 2);
        assert!(matches!(
            args.command,
            Command::Decode { ref bits, json: true } if bits == "0101"
        ));
    }

    #[test]
    fn test_parse_run_with_config() {
        let args = Args::parse_from(["goldilock", "--config", "door.toml", "run"]);
        assert_eq!(args.config, Some(PathBuf::from("door.toml")));
        assert!(matches!(args.command, Command::Run));
    }
}
