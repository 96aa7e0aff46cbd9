//! Filename classification for sorting loose files into category folders.
//!
//! Classification looks only at the filename string. Extensions owned by a
//! category map directly; a handful of ambiguous extensions (PDFs, word
//! processing documents, text) are resolved by looking at the name itself.
//!
//! # Examples
//!
//! ```
//! use sortfiles::file_category::{Category, FileClassifier};
//!
//! let classifier = FileClassifier::new().unwrap();
//! assert_eq!(classifier.classify("photo.PNG", false), Some(Category::Images));
//! assert_eq!(classifier.classify("q3_threat_briefing.pdf", false), Some(Category::Reports));
//! assert_eq!(classifier.classify("archive.zip", false), None);
//! ```

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// A destination bucket for sorted files.
///
/// Each category names a subdirectory that must already exist inside the
/// directory being sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Photos, screenshots and vector images
    Images,
    /// Video and audio recordings
    Videos,
    /// Slide decks
    Presentations,
    /// Spreadsheets, CSV dumps, small databases
    DataExports,
    /// Certificates, keys and signatures
    CertsAndKeys,
    /// E-books and long-form PDFs
    Ebooks,
    /// Disk images and installer packages (downloads only)
    Installers,
    /// Course material and certification slides
    Training,
    /// Reports, assessments and whitepapers
    Reports,
    /// Document templates
    Templates,
    /// Receipts, invoices, HR paperwork
    Personal,
    /// Notes, cheat sheets and saved pages
    Reference,
    /// Everything else that looks like work paperwork
    WorkDocs,
    /// Papers exported as "author name_title.pdf" (downloads only)
    ConferencePapers,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 14] = [
        Category::Images,
        Category::Videos,
        Category::Presentations,
        Category::DataExports,
        Category::CertsAndKeys,
        Category::Ebooks,
        Category::Installers,
        Category::Training,
        Category::Reports,
        Category::Templates,
        Category::Personal,
        Category::Reference,
        Category::WorkDocs,
        Category::ConferencePapers,
    ];

    /// Returns the subdirectory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortfiles::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "images");
    /// assert_eq!(Category::WorkDocs.dir_name(), "work-docs");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Videos => "videos",
            Category::Presentations => "presentations",
            Category::DataExports => "data-exports",
            Category::CertsAndKeys => "certs-and-keys",
            Category::Ebooks => "ebooks",
            Category::Installers => "installers",
            Category::Training => "training",
            Category::Reports => "reports",
            Category::Templates => "templates",
            Category::Personal => "personal",
            Category::Reference => "reference",
            Category::WorkDocs => "work-docs",
            Category::ConferencePapers => "conference-papers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Extensions owned by a category in every directory.
pub const EXTENSION_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &["png", "jpg", "jpeg", "svg", "webp", "heic", "gif"],
    ),
    (Category::Videos, &["mp4", "mov", "mkv", "mp3", "m4a", "wav"]),
    (Category::Presentations, &["pptx", "ppt", "pot", "key"]),
    (
        Category::DataExports,
        &["xlsx", "xls", "xlsm", "csv", "tsv", "json", "sqlite3", "iqy"],
    ),
    (
        Category::CertsAndKeys,
        &["pem", "asc", "cer", "crt", "p12", "pfx", "gpg"],
    ),
    (Category::Ebooks, &["epub", "mobi"]),
];

/// Extensions owned by a category only when sorting the downloads directory.
pub const DOWNLOADS_EXTENSION_TABLE: &[(Category, &[&str])] =
    &[(Category::Installers, &["dmg", "msi", "pkg"])];

/// Extensions with no direct category; resolved from the filename instead.
pub const AMBIGUOUS_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "rtf", "html", "md", "txt", "zip"];

const WORD_PROCESSING_EXTENSIONS: &[&str] = &["docx", "doc", "rtf"];
const TEXT_EXTENSIONS: &[&str] = &["md", "txt"];

/// PDF name heuristics. Order matters: the first matching rule wins.
const PDF_RULE_PATTERNS: &[(Category, &str)] = &[
    (
        Category::Training,
        r"cert|certificate|slides_|course|training|sans|cissp",
    ),
    (
        Category::Reports,
        r"report|pentest|threat|assessment|analysis|incident|briefing|whitepaper",
    ),
    (Category::Ebooks, r"handbook|guide|book|manual"),
    (Category::Templates, r"template"),
    (
        Category::Personal,
        r"receipt|invoice|bonus|benefit|insurance|rental|offer.letter|rsu|disability|salary",
    ),
    (Category::Reference, r"cheatsheet|cheat-sheet|quickref|checklist"),
];

/// "first last_title.pdf": two lowercase words, a space, then an underscore.
const CONFERENCE_PAPER_PATTERN: &str = r"^[a-z]+ [a-z']+_.+";

static PDF_RULES: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    PDF_RULE_PATTERNS
        .iter()
        .map(|(category, pattern)| {
            let regex = Regex::new(pattern).expect("built-in PDF rule must compile");
            (*category, regex)
        })
        .collect()
});

static CONFERENCE_PAPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(CONFERENCE_PAPER_PATTERN).expect("built-in conference paper pattern must compile")
});

/// Errors found while validating the built-in rule tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// An extension was claimed by more than one table entry.
    #[error("extension '{extension}' is claimed by both {first} and {second}")]
    DuplicateExtension {
        extension: String,
        first: String,
        second: String,
    },
    /// A table entry is not a lowercase, dot-free extension.
    #[error("extension '{0}' must be lowercase without a leading dot")]
    MalformedExtension(String),
}

/// Checks that the extension tables and the ambiguous set partition the
/// extensions they mention: no extension may have two owners.
pub fn validate_tables() -> Result<(), ClassifierError> {
    let mut owners: HashMap<&str, String> = HashMap::new();

    let universal = EXTENSION_TABLE
        .iter()
        .flat_map(|(category, exts)| exts.iter().map(move |ext| (*ext, category.to_string())));
    let downloads = DOWNLOADS_EXTENSION_TABLE.iter().flat_map(|(category, exts)| {
        exts.iter()
            .map(move |ext| (*ext, format!("{} (downloads)", category)))
    });
    let ambiguous = AMBIGUOUS_EXTENSIONS
        .iter()
        .map(|ext| (*ext, "the ambiguous set".to_string()));

    for (ext, owner) in universal.chain(downloads).chain(ambiguous) {
        if ext.is_empty() || ext.starts_with('.') || ext.to_lowercase() != ext {
            return Err(ClassifierError::MalformedExtension(ext.to_string()));
        }
        if let Some(first) = owners.get(ext) {
            return Err(ClassifierError::DuplicateExtension {
                extension: ext.to_string(),
                first: first.clone(),
                second: owner,
            });
        }
        owners.insert(ext, owner);
    }

    Ok(())
}

/// Returns the lowercased text after the last '.' in `filename`.
///
/// Returns `None` when there is no '.' or nothing follows it.
///
/// # Examples
///
/// ```
/// use sortfiles::file_category::extension_of;
///
/// assert_eq!(extension_of("Report.PDF"), Some("pdf".to_string()));
/// assert_eq!(extension_of("backup.tar.gz"), Some("gz".to_string()));
/// assert_eq!(extension_of("Makefile"), None);
/// assert_eq!(extension_of("trailing."), None);
/// ```
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

fn lookup(table: &[(Category, &[&str])], ext: &str) -> Option<Category> {
    table
        .iter()
        .find(|(_, exts)| exts.contains(&ext))
        .map(|(category, _)| *category)
}

/// Maps filenames to categories using the built-in tables and heuristics.
///
/// Construct it with [`FileClassifier::new`], which validates the rule
/// tables once; classification itself never fails.
#[derive(Debug, Clone, Copy)]
pub struct FileClassifier {
    _validated: (),
}

impl FileClassifier {
    /// Validates the rule tables and returns a classifier.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassifierError`] if an extension is owned twice or is
    /// malformed.
    pub fn new() -> Result<Self, ClassifierError> {
        validate_tables()?;
        // Force regex compilation up front so a bad pattern fails at startup.
        LazyLock::force(&PDF_RULES);
        LazyLock::force(&CONFERENCE_PAPER_RE);
        Ok(Self { _validated: () })
    }

    /// Determines the category for `filename`.
    ///
    /// `is_downloads` enables the downloads-only categories (installers,
    /// conference papers).
    pub fn classify(&self, filename: &str, is_downloads: bool) -> Option<Category> {
        let ext = extension_of(filename)?;
        self.classify_by_extension(&ext, is_downloads)
            .or_else(|| self.classify_by_name(filename, &ext, is_downloads))
    }

    /// Looks `ext` up in the extension tables. Ambiguous and unknown
    /// extensions return `None`.
    pub fn classify_by_extension(&self, ext: &str, is_downloads: bool) -> Option<Category> {
        if let Some(category) = lookup(EXTENSION_TABLE, ext) {
            return Some(category);
        }
        if is_downloads {
            return lookup(DOWNLOADS_EXTENSION_TABLE, ext);
        }
        None
    }

    /// Resolves an ambiguous extension by inspecting the filename.
    ///
    /// PDFs always resolve to some category; other extensions may not.
    pub fn classify_by_name(
        &self,
        filename: &str,
        ext: &str,
        is_downloads: bool,
    ) -> Option<Category> {
        let name_lower = filename.to_lowercase();

        match ext {
            "pdf" => Some(classify_pdf(&name_lower, is_downloads)),
            ext if WORD_PROCESSING_EXTENSIONS.contains(&ext) => Some(Category::WorkDocs),
            "html" => Some(Category::Reference),
            ext if TEXT_EXTENSIONS.contains(&ext) => Some(Category::Reference),
            "zip" if is_downloads => Some(Category::Installers),
            _ => None,
        }
    }
}

fn classify_pdf(name_lower: &str, is_downloads: bool) -> Category {
    if is_downloads && CONFERENCE_PAPER_RE.is_match(name_lower) {
        return Category::ConferencePapers;
    }

    PDF_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(name_lower))
        .map(|(category, _)| *category)
        .unwrap_or(Category::WorkDocs)
}
