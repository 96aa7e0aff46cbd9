use clap::Parser;
use sortfiles::cli::{Cli, effective_config, run};
use sortfiles::config::SortConfig;
use sortfiles::output::OutputFormatter;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout stays the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match effective_config(&cli, SortConfig::from_environment()) {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
