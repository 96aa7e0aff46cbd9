//! Run configuration.
//!
//! The default directories to sort, and which of them counts as the downloads
//! folder, are resolved once at startup and handed to the CLI explicitly. Nothing
//! below the CLI reads the environment.
//!
//! ```no_run
//! use sortfiles::config::SortConfig;
//!
//! let config = SortConfig::from_environment().unwrap();
//! for dir in &config.default_directories {
//!     println!("{}", dir.display());
//! }
//! ```

use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while building the configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The user's home directory could not be determined.
    #[error("could not determine the home directory")]
    HomeNotFound,
}

/// Where to sort when no directories are given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    /// Directories sorted by default, in order.
    pub default_directories: Vec<PathBuf>,
    /// The directory that enables downloads-only categories, if any.
    pub downloads_dir: Option<PathBuf>,
}

impl SortConfig {
    /// Builds a configuration with explicit paths.
    pub fn new(default_directories: Vec<PathBuf>, downloads_dir: Option<PathBuf>) -> Self {
        Self {
            default_directories,
            downloads_dir,
        }
    }

    /// Uses the user's Documents and Downloads folders.
    ///
    /// Platform folder lookups fall back to `~/Documents` and `~/Downloads`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HomeNotFound` if no home directory is known.
    pub fn from_environment() -> Result<Self, ConfigError> {
        let user_dirs = UserDirs::new().ok_or(ConfigError::HomeNotFound)?;
        let home = user_dirs.home_dir();

        let documents = user_dirs
            .document_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| home.join("Documents"));
        let downloads = user_dirs
            .download_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| home.join("Downloads"));

        Ok(Self::new(vec![documents, downloads.clone()], Some(downloads)))
    }

    /// Returns true if `directory` is the configured downloads folder.
    ///
    /// Both sides are canonicalized when possible so that `~/Downloads/.` and
    /// symlinked paths compare equal.
    pub fn is_downloads(&self, directory: &Path) -> bool {
        let Some(downloads) = &self.downloads_dir else {
            return false;
        };
        canonical(directory) == canonical(downloads)
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
