//! Command-line interface module for sortfiles.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing and validation
//! - Choosing the directories to sort
//! - Orchestrating the sorter over each directory
//! - Aggregating counts and printing the summary

use crate::config::{ConfigError, SortConfig};
use crate::file_category::FileClassifier;
use crate::file_organizer::{CategoryCounts, FileSorter, SortOptions};
use crate::output::OutputFormatter;
use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Sort loose files into categorized subdirectories.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sortfiles", version, about)]
pub struct Cli {
    /// Show what would be moved without moving anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show each move
    #[arg(short, long)]
    pub verbose: bool,

    /// Directories to sort (default: ~/Documents ~/Downloads)
    pub directories: Vec<String>,
}

/// Errors that stop a run before any file is touched.
#[derive(Debug, Error)]
pub enum CliError {
    /// A directory given on the command line does not exist.
    #[error("'{0}' is not a valid directory")]
    InvalidDirectory(String),
}

/// What a completed run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files moved (or that would be moved) per category, across directories.
    pub counts: CategoryCounts,
    /// Number of moves that failed.
    pub failed_moves: usize,
}

impl RunSummary {
    /// True when every attempted move succeeded.
    pub fn is_success(&self) -> bool {
        self.failed_moves == 0
    }
}

/// Runs the sorter over the requested (or default) directories.
///
/// Explicit directories are all validated before anything is processed.
/// Missing default directories are skipped with a warning.
///
/// # Errors
///
/// Returns [`CliError::InvalidDirectory`] for a bad argument, or the
/// underlying error if the classifier tables are invalid or a directory
/// cannot be listed.
///
/// # Examples
///
/// ```no_run
/// use sortfiles::cli::{run, Cli};
/// use sortfiles::config::SortConfig;
///
/// let cli = Cli { dry_run: true, verbose: true, directories: vec![] };
/// let config = SortConfig::from_environment().unwrap();
/// let summary = run(&cli, &config).unwrap();
/// println!("{} files", summary.counts.total());
/// ```
pub fn run(cli: &Cli, config: &SortConfig) -> anyhow::Result<RunSummary> {
    let directories = resolve_directories(&cli.directories, config)?;

    let classifier = FileClassifier::new()?;
    let sorter = FileSorter::new(
        classifier,
        SortOptions {
            simulate: cli.dry_run,
            verbose: cli.verbose,
        },
    );

    let mut summary = RunSummary::default();

    for directory in &directories {
        OutputFormatter::directory_header(&display_name(directory));

        let is_downloads = config.is_downloads(directory);
        info!(directory = %directory.display(), is_downloads, "sorting");

        let report = sorter.process_directory(directory, is_downloads)?;
        summary.counts.merge(&report.counts);
        summary.failed_moves += report.failures.len();
    }

    OutputFormatter::summary_table(&summary.counts, cli.dry_run);

    if !summary.is_success() {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be moved. Please review errors above.",
            summary.failed_moves
        ));
    }

    Ok(summary)
}

/// Picks the configuration for this run.
///
/// The environment lookup only matters when no directories were given; with
/// explicit directories a failed lookup falls back to no defaults and no
/// downloads folder.
///
/// # Errors
///
/// Returns the lookup error when no directories were given.
pub fn effective_config(
    cli: &Cli,
    from_environment: Result<SortConfig, ConfigError>,
) -> Result<SortConfig, ConfigError> {
    match from_environment {
        Ok(config) => Ok(config),
        Err(e) if cli.directories.is_empty() => Err(e),
        Err(e) => {
            warn!(error = %e, "no default directories, sorting explicit arguments only");
            Ok(SortConfig::new(vec![], None))
        }
    }
}

/// Returns the directories to sort.
///
/// Explicit arguments must all be existing directories; they are returned
/// canonicalized. With no arguments the configured defaults that exist are
/// returned.
pub fn resolve_directories(args: &[String], config: &SortConfig) -> Result<Vec<PathBuf>, CliError> {
    if args.is_empty() {
        return Ok(config
            .default_directories
            .iter()
            .filter(|dir| {
                let exists = dir.is_dir();
                if !exists {
                    warn!(directory = %dir.display(), "default directory missing");
                    OutputFormatter::warning(&format!(
                        "Skipping {}: not a directory",
                        dir.display()
                    ));
                }
                exists
            })
            .cloned()
            .collect());
    }

    args.iter()
        .map(|arg| {
            let path = Path::new(arg);
            if !path.is_dir() {
                return Err(CliError::InvalidDirectory(arg.clone()));
            }
            Ok(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
        })
        .collect()
}

fn display_name(directory: &Path) -> String {
    directory
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| directory.display().to_string())
}
