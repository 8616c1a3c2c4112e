//! Entry point for the `envelope-inspect` binary.

use std::process::ExitCode;

use clap::Parser;
use envelope_cli::args::Cli;
use envelope_core::{inspect, InspectConfig};
use tracing_subscriber::EnvFilter;

/// Exit status when the report fell back to diagnostics.
const EXIT_NOT_PARSED: u8 = 1;
/// Exit status when the payload could not be read at all.
const EXIT_INPUT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let source = cli.source();
    let payload = match source.read_payload(std::io::stdin().lock()) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(?source, error = %e, "failed to read payload");
            return ExitCode::from(EXIT_INPUT_ERROR);
        }
    };

    let config = cli.config(InspectConfig::from_env());
    let report = inspect(&payload, &config);

    if cli.json {
        match serde_json::to_string_pretty(&report.to_json()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize report");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{report}");
    }

    if report.is_parsed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_PARSED)
    }
}
