//! Output formatting and styling module.
//!
//! All user-facing text goes through here: directory headers, per-move lines,
//! the final summary, and coloured warnings and errors on stderr.

use crate::file_category::Category;
use crate::file_organizer::CategoryCounts;
use colored::*;
use std::fmt::Write as _;

const CATEGORY_WIDTH: usize = 20;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortfiles::output::OutputFormatter;
    /// OutputFormatter::error("Failed to move report.pdf");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow on stderr.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints the `--- Sorting <name> ---` header for a directory.
    pub fn directory_header(name: &str) {
        println!("{}", format!("--- Sorting {} ---", name).bold());
    }

    /// Prints one move as `<filename> -> <category>/`.
    pub fn move_line(file_name: &str, category: Category, simulated: bool) {
        println!("{}", Self::format_move(file_name, category, simulated));
    }

    /// Formats one move line.
    ///
    /// ```
    /// use sortfiles::file_category::Category;
    /// use sortfiles::output::OutputFormatter;
    ///
    /// assert_eq!(
    ///     OutputFormatter::format_move("a.png", Category::Images, true),
    ///     "  [dry run] a.png -> images/"
    /// );
    /// ```
    pub fn format_move(file_name: &str, category: Category, simulated: bool) -> String {
        let prefix = if simulated { "[dry run] " } else { "" };
        format!("  {}{} -> {}/", prefix, file_name, category)
    }

    /// Prints the summary table, or a single line when nothing moved.
    pub fn summary_table(counts: &CategoryCounts, simulated: bool) {
        print!("{}", Self::format_summary(counts, simulated));
    }

    /// Formats the summary: one row per category in alphabetical order, a
    /// separator, then the total.
    ///
    /// ```
    /// use sortfiles::file_category::Category;
    /// use sortfiles::file_organizer::CategoryCounts;
    /// use sortfiles::output::OutputFormatter;
    ///
    /// let counts = CategoryCounts::new();
    /// assert_eq!(OutputFormatter::format_summary(&counts, false), "No loose files found.\n");
    /// ```
    pub fn format_summary(counts: &CategoryCounts, simulated: bool) -> String {
        let total = counts.total();
        if total == 0 {
            return "No loose files found.\n".to_string();
        }

        let prefix = if simulated { "[dry run] " } else { "" };
        let mut out = format!("\n{}Summary:\n", prefix);
        for (category, count) in counts.sorted() {
            let _ = writeln!(
                out,
                "  {:<width$} {}",
                category.dir_name(),
                count,
                width = CATEGORY_WIDTH
            );
        }
        out.push_str("  ---\n");
        let _ = writeln!(out, "  {:<width$} {}", "Total", total, width = CATEGORY_WIDTH);
        out
    }
}
