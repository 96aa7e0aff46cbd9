//! sortfiles - sort loose files into category folders
//!
//! This library classifies files by name and extension and moves them into
//! category subdirectories that already exist next to them. Moves never
//! overwrite: a taken name gets a `_1`, `_2`, ... suffix.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;

pub use cli::{Cli, CliError, RunSummary, effective_config, run};
pub use config::{ConfigError, SortConfig};
pub use file_category::{Category, ClassifierError, FileClassifier};
pub use file_organizer::{
    CategoryCounts, FileMoveRecord, FileSorter, OrganizeError, OrganizeResult, SortOptions,
    SortReport, resolve_collision,
};
