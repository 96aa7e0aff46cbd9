//! Moving classified files into their category subdirectories.
//!
//! This module walks a single directory, asks the classifier for each loose
//! file's category, picks a destination that never overwrites anything, and
//! moves the file (or only records the move when simulating).

use crate::file_category::{Category, FileClassifier};
use crate::output::OutputFormatter;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// A single move, real or simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMoveRecord {
    /// Where the file was found.
    pub source: PathBuf,
    /// Where the file went (or would go).
    pub destination: PathBuf,
    /// The category the file was sorted into.
    pub category: Category,
    /// True when nothing was touched on disk.
    pub simulated: bool,
}

/// Per-category tally of moved files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: HashMap<Category, usize>,
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, category: Category) {
        *self.counts.entry(category).or_insert(0) += 1;
    }

    /// Adds every count from `other` into `self`.
    pub fn merge(&mut self, other: &CategoryCounts) {
        for (category, count) in &other.counts {
            *self.counts.entry(*category).or_insert(0) += count;
        }
    }

    pub fn get(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Returns the non-zero counts ordered by directory name, ignoring case.
    pub fn sorted(&self) -> Vec<(Category, usize)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .filter(|&(_, count)| *count > 0)
            .map(|(category, count)| (*category, *count))
            .collect();
        entries.sort_by_key(|(category, _)| category.dir_name().to_lowercase());
        entries
    }
}

/// Errors that can occur while sorting a directory.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The directory being sorted could not be listed.
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDirectory { path: PathBuf, source: io::Error },
    /// A file could not be moved into its category directory.
    #[error("Failed to move {} to {}: {source}", .file.display(), .destination.display())]
    FileMoveFailure {
        file: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Outcome of sorting one directory.
#[derive(Debug, Default)]
pub struct SortReport {
    /// Files moved (or that would be moved) per category.
    pub counts: CategoryCounts,
    /// Every move in the order it happened.
    pub moves: Vec<FileMoveRecord>,
    /// Moves that failed; the files were left where they were.
    pub failures: Vec<OrganizeError>,
}

/// Run-wide switches for the sorter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    /// Only report moves; never touch the filesystem.
    pub simulate: bool,
    /// Print a line for every move.
    pub verbose: bool,
}

/// Sorts the loose files of a directory into existing category folders.
pub struct FileSorter {
    classifier: FileClassifier,
    options: SortOptions,
}

impl FileSorter {
    pub fn new(classifier: FileClassifier, options: SortOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    /// Sorts the loose files directly inside `directory`.
    ///
    /// Entries are visited in name order. Hidden files, non-files,
    /// unclassified files and files whose category folder is missing are left
    /// alone. A failed move is recorded in the report and the next file is
    /// processed.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::ReadDirectory`] if `directory` cannot be listed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sortfiles::file_category::FileClassifier;
    /// use sortfiles::file_organizer::{FileSorter, SortOptions};
    /// use std::path::Path;
    ///
    /// let classifier = FileClassifier::new().unwrap();
    /// let sorter = FileSorter::new(classifier, SortOptions { simulate: true, verbose: true });
    /// let report = sorter.process_directory(Path::new("/home/me/Downloads"), true).unwrap();
    /// println!("{} files would move", report.counts.total());
    /// ```
    pub fn process_directory(
        &self,
        directory: &Path,
        is_downloads: bool,
    ) -> OrganizeResult<SortReport> {
        let read_error = |source| OrganizeError::ReadDirectory {
            path: directory.to_path_buf(),
            source,
        };

        let mut entries = fs::read_dir(directory)
            .map_err(read_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut report = SortReport::default();

        for entry in entries {
            let path = entry.path();
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().to_string();

            if name.starts_with('.') || !path.is_file() {
                continue;
            }

            let Some(category) = self.classifier.classify(&name, is_downloads) else {
                debug!(file = %name, "no category, leaving in place");
                continue;
            };

            let category_dir = directory.join(category.dir_name());
            if !category_dir.is_dir() {
                debug!(file = %name, %category, "category folder missing, leaving in place");
                continue;
            }

            let destination = resolve_collision(&category_dir.join(&file_name));
            let record = FileMoveRecord {
                source: path,
                destination,
                category,
                simulated: self.options.simulate,
            };

            if !record.simulated {
                if let Err(e) = move_file(&record.source, &record.destination) {
                    error!(error = %e, "move failed");
                    OutputFormatter::error(&e.to_string());
                    report.failures.push(e);
                    continue;
                }
                info!(
                    from = %record.source.display(),
                    to = %record.destination.display(),
                    "moved"
                );
            }

            if self.options.verbose {
                OutputFormatter::move_line(&name, category, record.simulated);
            }

            report.counts.increment(category);
            report.moves.push(record);
        }

        Ok(report)
    }
}

/// Returns `dest` if nothing exists there, otherwise the first free
/// `<stem>_<n><suffix>` for n = 1, 2, 3, ...
///
/// # Examples
///
/// ```no_run
/// use sortfiles::file_organizer::resolve_collision;
/// use std::path::Path;
///
/// // With images/photo.png and images/photo_1.png already present:
/// let dest = resolve_collision(Path::new("images/photo.png"));
/// assert_eq!(dest, Path::new("images/photo_2.png"));
/// ```
pub fn resolve_collision(dest: &Path) -> PathBuf {
    if !is_taken(dest) {
        return dest.to_path_buf();
    }

    let parent = dest.parent().unwrap_or_else(|| Path::new(""));
    let stem = dest.file_stem().unwrap_or_default();
    let extension = dest.extension();

    // Built from OsStr pieces so names that are not UTF-8 survive intact.
    let candidate_name = |n: u64| {
        let mut name = OsString::from(stem);
        name.push(format!("_{}", n));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        name
    };

    (1u64..)
        .map(|n| parent.join(candidate_name(n)))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| dest.to_path_buf())
}

/// Dangling symlinks count as taken.
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Renames `source` to `destination`, copying and removing when they sit on
/// different filesystems.
fn move_file(source: &Path, destination: &Path) -> OrganizeResult<()> {
    let failure = |e| OrganizeError::FileMoveFailure {
        file: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source: e,
    };

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %source.display(), "cross-device move, copying instead");
            copy_then_remove(source, destination, |path| fs::remove_file(path)).map_err(failure)
        }
        Err(e) => Err(failure(e)),
    }
}

/// Copies `source` to `destination`, then removes `source` with `remove_source`.
/// If the removal fails the copy is deleted again, so the file is never left
/// in both places.
fn copy_then_remove(
    source: &Path,
    destination: &Path,
    remove_source: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<()> {
    fs::copy(source, destination)?;
    if let Err(e) = remove_source(source) {
        if let Err(cleanup) = fs::remove_file(destination) {
            error!(
                path = %destination.display(),
                error = %cleanup,
                "could not remove partial copy"
            );
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sorter(simulate: bool) -> FileSorter {
        let classifier = FileClassifier::new().expect("Failed to build classifier");
        FileSorter::new(
            classifier,
            SortOptions {
                simulate,
                verbose: false,
            },
        )
    }

    #[test]
    fn test_resolve_collision_free_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dest = temp_dir.path().join("photo.png");
        assert_eq!(resolve_collision(&dest), dest);
    }

    #[test]
    fn test_resolve_collision_skips_taken_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("photo.png"), "a").expect("Failed to write file");
        fs::write(base.join("photo_1.png"), "b").expect("Failed to write file");

        assert_eq!(
            resolve_collision(&base.join("photo.png")),
            base.join("photo_2.png")
        );
    }

    #[test]
    fn test_resolve_collision_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("LICENSE"), "a").expect("Failed to write file");

        assert_eq!(resolve_collision(&base.join("LICENSE")), base.join("LICENSE_1"));
    }

    #[test]
    fn test_resolve_collision_keeps_inner_dots_in_stem() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("backup.tar.gz"), "a").expect("Failed to write file");

        assert_eq!(
            resolve_collision(&base.join("backup.tar.gz")),
            base.join("backup.tar_1.gz")
        );
    }

    #[test]
    fn test_move_file_reports_vanished_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let source = base.join("gone.png");
        let destination = base.join("gone_moved.png");

        let result = move_file(&source, &destination);

        match result {
            Err(OrganizeError::FileMoveFailure { file, .. }) => assert_eq!(file, source),
            other => panic!("expected move failure, got {:?}", other),
        }
        assert!(!destination.exists());
    }

    #[test]
    fn test_copy_then_remove_cleans_up_when_source_stays() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let source = base.join("photo.png");
        let destination = base.join("photo_copy.png");
        fs::write(&source, "png").expect("Failed to write file");

        let result = copy_then_remove(&source, &destination, |_| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        });

        assert!(result.is_err());
        assert!(source.exists());
        assert!(!destination.exists());
    }

    #[test]
    fn test_copy_then_remove_moves_contents() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let source = base.join("photo.png");
        let destination = base.join("photo_copy.png");
        fs::write(&source, "png").expect("Failed to write file");

        copy_then_remove(&source, &destination, |path| fs::remove_file(path))
            .expect("Failed to copy");

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).expect("read"), "png");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_kept_exactly() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).expect("Failed to create dir");
        let name = std::ffi::OsStr::from_bytes(b"caf\xe9.png");
        fs::write(base.join(name), "png").expect("Failed to write file");

        let report = sorter(false)
            .process_directory(base, false)
            .expect("Failed to sort");

        assert_eq!(report.counts.get(Category::Images), 1);
        assert!(base.join("images").join(name).exists());
        assert!(!base.join(name).exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_collision_keeps_stem_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let name = std::ffi::OsStr::from_bytes(b"caf\xe9.png");
        fs::write(base.join(name), "png").expect("Failed to write file");

        let expected = std::ffi::OsStr::from_bytes(b"caf\xe9_1.png");
        assert_eq!(resolve_collision(&base.join(name)), base.join(expected));
    }

    #[test]
    fn test_category_counts_sorted_and_merged() {
        let mut a = CategoryCounts::new();
        a.increment(Category::Reports);
        a.increment(Category::Images);
        let mut b = CategoryCounts::new();
        b.increment(Category::Reports);
        b.increment(Category::CertsAndKeys);

        a.merge(&b);

        assert_eq!(a.total(), 4);
        assert_eq!(a.get(Category::Reports), 2);
        assert_eq!(
            a.sorted(),
            vec![
                (Category::CertsAndKeys, 1),
                (Category::Images, 1),
                (Category::Reports, 2),
            ]
        );
    }

    #[test]
    fn test_process_directory_moves_into_existing_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).expect("Failed to create dir");
        fs::write(base.join("photo.png"), "png").expect("Failed to write file");

        let report = sorter(false)
            .process_directory(base, false)
            .expect("Failed to sort");

        assert_eq!(report.counts.get(Category::Images), 1);
        assert!(!base.join("photo.png").exists());
        assert!(base.join("images/photo.png").exists());
        assert_eq!(report.moves.len(), 1);
        assert!(!report.moves[0].simulated);
    }

    #[test]
    fn test_process_directory_never_creates_folders() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("photo.png"), "png").expect("Failed to write file");

        let report = sorter(false)
            .process_directory(base, false)
            .expect("Failed to sort");

        assert!(report.counts.is_empty());
        assert!(base.join("photo.png").exists());
        assert!(!base.join("images").exists());
    }

    #[test]
    fn test_process_directory_renames_on_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).expect("Failed to create dir");
        fs::write(base.join("images/photo.png"), "old").expect("Failed to write file");
        fs::write(base.join("photo.png"), "new").expect("Failed to write file");

        sorter(false)
            .process_directory(base, false)
            .expect("Failed to sort");

        assert_eq!(
            fs::read_to_string(base.join("images/photo.png")).expect("read"),
            "old"
        );
        assert_eq!(
            fs::read_to_string(base.join("images/photo_1.png")).expect("read"),
            "new"
        );
    }

    #[test]
    fn test_process_directory_skips_hidden_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).expect("Failed to create dir");
        fs::write(base.join(".hidden.png"), "png").expect("Failed to write file");
        fs::write(base.join(".DS_Store"), "meta").expect("Failed to write file");

        let report = sorter(false)
            .process_directory(base, false)
            .expect("Failed to sort");

        assert!(report.counts.is_empty());
        assert!(base.join(".hidden.png").exists());
        assert!(base.join(".DS_Store").exists());
    }

    #[test]
    fn test_process_directory_ignores_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).expect("Failed to create dir");
        fs::create_dir(base.join("album.png")).expect("Failed to create dir");

        let report = sorter(false)
            .process_directory(base, false)
            .expect("Failed to sort");

        assert!(report.counts.is_empty());
        assert!(base.join("album.png").is_dir());
    }

    #[test]
    fn test_simulate_touches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).expect("Failed to create dir");
        fs::write(base.join("photo.png"), "png").expect("Failed to write file");

        let report = sorter(true)
            .process_directory(base, false)
            .expect("Failed to sort");

        assert_eq!(report.counts.get(Category::Images), 1);
        assert!(report.moves[0].simulated);
        assert_eq!(report.moves[0].destination, base.join("images/photo.png"));
        assert!(base.join("photo.png").exists());
        assert!(!base.join("images/photo.png").exists());
    }

    #[test]
    fn test_process_missing_directory_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("nope");

        let result = sorter(false).process_directory(&missing, false);
        assert!(matches!(result, Err(OrganizeError::ReadDirectory { .. })));
    }
}
