//! Content processing: language detection, comment stripping, and chunking
//!
//! Processing is computed on demand and never cached; processing the same
//! entry twice recomputes everything from the file on disk.

mod chunker;
pub mod language;

pub use chunker::{count_tokens, Chunker, ChunkerOptions, DEFAULT_CHUNK_SIZE};

use std::path::Path;

use rayon::prelude::*;

use crate::error::{ProcessError, ValidationError};
use crate::types::{FileEntry, ProcessedContent};

/// Options for content processing.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorOptions {
    /// Chunk window size in bytes; zero falls back to the default of 4096.
    pub max_chunk_size: usize,

    /// Overlap between consecutive chunks in bytes.
    pub chunk_overlap: usize,

    /// Approximate token budget; also gates eligibility (see
    /// [`Processor::should_process`]).
    pub max_tokens: usize,

    /// Remove comments from recognized languages before chunking.
    pub strip_comments: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: 0,
            max_tokens: 0,
            strip_comments: false,
        }
    }
}

/// Turns selected entries into [`ProcessedContent`] ready for the writer.
pub struct Processor {
    opts: ProcessorOptions,
    chunker: Chunker,
}

impl Processor {
    pub fn new(mut opts: ProcessorOptions) -> Result<Self, ValidationError> {
        if opts.max_chunk_size == 0 {
            opts.max_chunk_size = DEFAULT_CHUNK_SIZE;
        }
        let chunker = Chunker::new(ChunkerOptions {
            max_size: opts.max_chunk_size,
            overlap: opts.chunk_overlap,
            max_tokens: opts.max_tokens,
        })?;
        Ok(Self { opts, chunker })
    }

    /// Whether an entry is worth processing at all: binary files, empty
    /// files, and files far beyond the token budget are skipped.
    pub fn should_process(&self, entry: &FileEntry) -> bool {
        if entry.is_binary {
            return false;
        }
        if entry.size == 0 {
            return false;
        }
        // Rough four-bytes-per-token estimate against the budget.
        if self.opts.max_tokens > 0 && entry.size > (self.opts.max_tokens as u64) * 4 {
            return false;
        }
        true
    }

    /// Process one entry: read content, fill in the language, optionally
    /// strip comments, and chunk when the content exceeds the window size.
    ///
    /// Ineligible entries come back with empty content rather than an error.
    pub fn process(&self, root: &Path, entry: &FileEntry) -> Result<ProcessedContent, ProcessError> {
        if !self.should_process(entry) {
            return Ok(ProcessedContent {
                entry: entry.clone(),
                content: Vec::new(),
                chunks: Vec::new(),
            });
        }

        let path = root.join(&entry.path);
        let content = std::fs::read(&path).map_err(|err| ProcessError::ReadFailed {
            path: path.clone(),
            source: err,
        })?;

        let mut entry = entry.clone();
        if entry.language.is_none() {
            entry.language = Some(language::detect_language(&entry.path, &content));
        }

        let content = if self.opts.strip_comments {
            let language = entry.language.as_deref().unwrap_or("unknown");
            language::strip_comments(&content, language)
        } else {
            content
        };

        let chunks = if content.len() > self.opts.max_chunk_size {
            self.chunker.chunk(&content)
        } else {
            Vec::new()
        };

        tracing::debug!(
            path = %entry.path,
            bytes = content.len(),
            chunks = chunks.len(),
            "processed entry"
        );

        Ok(ProcessedContent {
            entry,
            content,
            chunks,
        })
    }

    /// Process many entries in parallel, preserving input order.
    pub fn process_all(
        &self,
        root: &Path,
        entries: &[FileEntry],
    ) -> Vec<Result<ProcessedContent, ProcessError>> {
        entries
            .par_iter()
            .map(|entry| self.process(root, entry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(path: &str, size: u64, is_binary: bool) -> FileEntry {
        FileEntry {
            path: path.to_string(),
            size,
            mod_time: Utc::now(),
            is_binary,
            is_selected: true,
            language: None,
        }
    }

    fn processor(opts: ProcessorOptions) -> Processor {
        Processor::new(opts).unwrap()
    }

    #[test]
    fn test_should_process_rejects_binary() {
        let p = processor(ProcessorOptions::default());
        assert!(!p.should_process(&entry("a.bin", 10, true)));
    }

    #[test]
    fn test_should_process_rejects_empty() {
        let p = processor(ProcessorOptions::default());
        assert!(!p.should_process(&entry("a.txt", 0, false)));
    }

    #[test]
    fn test_should_process_token_budget() {
        let p = processor(ProcessorOptions {
            max_tokens: 10,
            ..Default::default()
        });
        assert!(p.should_process(&entry("a.txt", 40, false)));
        assert!(!p.should_process(&entry("a.txt", 41, false)));
    }

    #[test]
    fn test_process_small_file_has_no_chunks() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("small.rs"), "fn main() {}\n").unwrap();

        let p = processor(ProcessorOptions::default());
        let processed = p
            .process(temp.path(), &entry("small.rs", 13, false))
            .unwrap();

        assert_eq!(processed.content, b"fn main() {}\n");
        assert!(processed.chunks.is_empty());
        assert_eq!(processed.entry.language.as_deref(), Some("rust"));
    }

    #[test]
    fn test_process_large_file_is_chunked() {
        let temp = TempDir::new().unwrap();
        let body = "word ".repeat(100);
        std::fs::write(temp.path().join("big.txt"), &body).unwrap();

        let p = processor(ProcessorOptions {
            max_chunk_size: 64,
            chunk_overlap: 8,
            ..Default::default()
        });
        let processed = p
            .process(temp.path(), &entry("big.txt", body.len() as u64, false))
            .unwrap();

        assert!(processed.chunks.len() > 1);
        for chunk in &processed.chunks {
            assert!(chunk.content.len() <= 64 + 1);
        }
    }

    #[test]
    fn test_process_ineligible_entry_is_empty() {
        let temp = TempDir::new().unwrap();
        let p = processor(ProcessorOptions::default());
        let processed = p.process(temp.path(), &entry("ghost.bin", 10, true)).unwrap();
        assert!(processed.content.is_empty());
        assert!(processed.chunks.is_empty());
    }

    #[test]
    fn test_process_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        let p = processor(ProcessorOptions::default());
        let result = p.process(temp.path(), &entry("missing.txt", 5, false));
        assert!(matches!(result, Err(ProcessError::ReadFailed { .. })));
    }

    #[test]
    fn test_process_strips_comments_when_asked() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("x.py"), "a = 1  # gone\n").unwrap();

        let p = processor(ProcessorOptions {
            strip_comments: true,
            ..Default::default()
        });
        let processed = p.process(temp.path(), &entry("x.py", 14, false)).unwrap();
        assert_eq!(processed.content, b"a = 1  \n");
    }

    #[test]
    fn test_process_preserves_existing_language() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("x.weird"), "data").unwrap();

        let mut e = entry("x.weird", 4, false);
        e.language = Some("fortran".to_string());

        let p = processor(ProcessorOptions::default());
        let processed = p.process(temp.path(), &e).unwrap();
        assert_eq!(processed.entry.language.as_deref(), Some("fortran"));
    }

    #[test]
    fn test_process_all_preserves_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "aaa").unwrap();
        std::fs::write(temp.path().join("b.txt"), "bbb").unwrap();

        let p = processor(ProcessorOptions::default());
        let results = p.process_all(
            temp.path(),
            &[entry("a.txt", 3, false), entry("b.txt", 3, false)],
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().entry.path, "a.txt");
        assert_eq!(results[1].as_ref().unwrap().entry.path, "b.txt");
    }

    #[test]
    fn test_zero_chunk_size_uses_default() {
        let p = processor(ProcessorOptions {
            max_chunk_size: 0,
            ..Default::default()
        });
        assert!(p.opts.max_chunk_size == DEFAULT_CHUNK_SIZE);
    }
}
