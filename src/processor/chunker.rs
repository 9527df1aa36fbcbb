//! Sliding-window content chunking
//!
//! Splits arbitrarily large content into bounded, overlapping segments for
//! size-limited downstream consumers. The engine is pure: no I/O, no shared
//! state, safe to invoke concurrently for independent inputs.

use crate::error::ValidationError;
use crate::types::Chunk;

/// Default chunk window size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Options for content chunking.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerOptions {
    /// Maximum size of each chunk window in bytes.
    pub max_size: usize,

    /// Number of bytes of deliberate overlap between consecutive chunks.
    pub overlap: usize,

    /// Approximate token budget per chunk. Carried on every chunk for
    /// downstream consumers but not used as a splitting boundary.
    pub max_tokens: usize,
}

impl Default for ChunkerOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CHUNK_SIZE,
            overlap: 0,
            max_tokens: 0,
        }
    }
}

/// Splits content into overlapping, size-bounded chunks.
pub struct Chunker {
    opts: ChunkerOptions,
}

impl Chunker {
    /// Create a chunker. Fails fast on a zero window size; every other
    /// option combination is valid, including `overlap >= max_size`.
    pub fn new(opts: ChunkerOptions) -> Result<Self, ValidationError> {
        if opts.max_size == 0 {
            return Err(ValidationError::zero("maxSize"));
        }
        Ok(Self { opts })
    }

    /// Split `content` into an ordered sequence of chunks.
    ///
    /// Empty content yields no chunks; content that fits in one window
    /// yields exactly one. Otherwise a window of up to `max_size` bytes
    /// slides forward by `max(1, max_size - overlap)` per step, so the tail
    /// of each chunk reappears at the head of the next. When the remaining
    /// tail is no longer than the overlap it becomes one final chunk.
    ///
    /// Bodies are whitespace-trimmed and newline-terminated; between that
    /// trimming and the overlap, concatenation loses no byte of the input.
    pub fn chunk(&self, content: &[u8]) -> Vec<Chunk> {
        if content.is_empty() {
            return Vec::new();
        }

        if content.len() <= self.opts.max_size {
            return vec![self.make_chunk(content)];
        }

        let mut chunks = Vec::new();
        let len = content.len();
        // Forward-progress floor: even overlap >= max_size advances by one.
        let step = self.opts.max_size.saturating_sub(self.opts.overlap).max(1);
        let mut pos = 0;

        while pos < len {
            let end = (pos + self.opts.max_size).min(len);
            chunks.push(self.make_chunk(&content[pos..end]));

            pos += step;

            if pos < len && len - pos <= self.opts.overlap {
                let tail = &content[pos..];
                if !tail.is_empty() {
                    chunks.push(self.make_chunk(tail));
                }
                break;
            }
        }

        chunks
    }

    fn make_chunk(&self, window: &[u8]) -> Chunk {
        let mut content = window.trim_ascii().to_vec();
        content.push(b'\n');
        Chunk {
            content,
            start_line: 1,
            end_line: 1,
            token_count: count_tokens(window),
        }
    }
}

/// Rough token estimate: the number of maximal runs of non-whitespace
/// bytes. A linear scan, no dictionary.
pub fn count_tokens(text: &[u8]) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for &b in text {
        if b.is_ascii_whitespace() {
            in_word = false;
        } else if !in_word {
            count += 1;
            in_word = true;
        }
    }

    count
}
