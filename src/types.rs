//! Core data model shared across the scanning and processing pipeline

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Options for a single scan invocation.
///
/// Immutable once a scan has started. Zero/empty fields passed to
/// [`crate::scanner::Scanner::scan`] leave the construction-time value in
/// place; non-zero fields win.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Directory to scan. Emitted paths are relative to this root.
    pub root_dir: PathBuf,

    /// Ordered ignore rules: exact glob (`*.ext`), substring containment,
    /// or directory wildcard (`dir/*`, which prunes the whole subtree).
    pub ignore_patterns: Vec<String>,

    /// Regular files larger than this many bytes are skipped. Directories
    /// are never size-filtered.
    pub max_file_size: u64,

    /// Hard cap on the number of candidate files handed to the worker pool.
    /// Zero means unlimited.
    pub max_files: usize,
}

impl ScanOptions {
    /// Merge non-zero/non-empty fields of `other` over `self`, last write wins.
    pub(crate) fn merge(&mut self, other: ScanOptions) {
        if !other.root_dir.as_os_str().is_empty() {
            self.root_dir = other.root_dir;
        }
        if !other.ignore_patterns.is_empty() {
            self.ignore_patterns = other.ignore_patterns;
        }
        if other.max_file_size > 0 {
            self.max_file_size = other.max_file_size;
        }
        if other.max_files > 0 {
            self.max_files = other.max_files;
        }
    }
}

/// A discovered file and its metadata.
///
/// Created by the worker pool once a path has passed filtering. The scanner
/// never touches an entry after emitting it; `is_selected` and `language`
/// are filled in by downstream consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Path relative to the scan root.
    pub path: String,

    /// File size in bytes.
    pub size: u64,

    /// Last modification time.
    pub mod_time: DateTime<Utc>,

    /// Result of the content-sampling binary check.
    pub is_binary: bool,

    /// Whether the user has selected this file for packing.
    pub is_selected: bool,

    /// Detected language, if any.
    pub language: Option<String>,
}

/// A bounded, possibly-overlapping segment of larger content.
///
/// Bodies are whitespace-trimmed and newline-terminated. The tail of one
/// chunk deliberately reappears at the head of the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Trimmed chunk body with exactly one trailing newline.
    pub content: Vec<u8>,

    /// First line marker. Always 1 in the current implementation.
    pub start_line: usize,

    /// Last line marker. Always 1 in the current implementation.
    pub end_line: usize,

    /// Number of whitespace-separated token runs in the untrimmed window.
    pub token_count: usize,
}

/// Fully processed file content, ready for the output writer.
///
/// Computed on demand and never cached; processing the same entry twice
/// recomputes everything.
#[derive(Debug, Clone)]
pub struct ProcessedContent {
    pub entry: FileEntry,
    pub content: Vec<u8>,
    pub chunks: Vec<Chunk>,
}

/// Supported artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
    Yaml,
}

impl OutputFormat {
    /// File extension for this format, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xml => ".xml",
            OutputFormat::Json => ".json",
            OutputFormat::Yaml => ".yaml",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Xml => write!(f, "xml"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xml" => Ok(OutputFormat::Xml),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(crate::error::ValidationError::UnsupportedFormat(
                other.to_string(),
            )),
        }
    }
}
