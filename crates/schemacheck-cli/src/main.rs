//! # schemacheck entry point
//!
//! Parses command-line arguments, installs logging and hands off to the
//! check command. This is the only place the process exit code is decided.

use std::process::ExitCode;

use clap::Parser;

use schemacheck_cli::check::{run_check, CheckArgs};
use schemacheck_cli::logging::{self, LogFormat};
use schemacheck_cli::VERSION;

/// Validate YAML and JSON documents against a JSON Schema.
#[derive(Parser, Debug)]
#[command(name = "schemacheck", about, long_about = None)]
struct Cli {
    #[command(flatten)]
    check: CheckArgs,

    /// Prints out the version of schemacheck.
    #[arg(short = 'v', long)]
    version: bool,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("schemacheck version: {VERSION}");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init(cli.log_format) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::from(1);
    }

    match run_check(&cli.check) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
