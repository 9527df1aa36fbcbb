//! # ctxpack - Concurrent Codebase Packing for LLM Context
//!
//! Scans a directory tree concurrently, classifies and filters files, chunks
//! oversized content into overlapping windows, and renders everything into a
//! single XML, JSON, or YAML artifact suitable for pasting into an LLM
//! context window.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  paths   ┌─────────────┐  entries  ┌───────────┐
//! │  walker  ├─────────▶│ worker pool ├──────────▶│  caller   │
//! └──────────┘ (cap 1)  │  (stat +    │  (cap 1)  └─────┬─────┘
//!                       │   classify) │                 │
//!                       └─────────────┘                 ▼
//!                                               ┌─────────────┐
//!                                               │  processor  │
//!                                               │ (language,  │
//!                                               │  chunking)  │
//!                                               └──────┬──────┘
//!                                                      ▼
//!                                               ┌─────────────┐
//!                                               │   writer    │
//!                                               └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`scanner`]: Concurrent, cancellable directory walking and file classification
//! - [`processor`]: Language detection, comment stripping, and sliding-window chunking
//! - [`writer`]: Buffered artifact rendering (XML, JSON, YAML)
//! - [`tree`]: Directory tree rendering for the artifact's context block
//! - [`config`]: Configuration management with environment variable support
//! - [`types`]: Shared data model
//! - [`error`]: Error types
//!
//! ## Usage Example
//!
//! ```no_run
//! use ctxpack::scanner::{self, Scanner};
//! use ctxpack::types::ScanOptions;
//!
//! # async fn run() {
//! let mut s = Scanner::new().with_root(".").with_max_files(100);
//! let (results, errors) = s.scan(ScanOptions::default());
//! let (entries, errs) = scanner::drain(results, errors).await;
//! # }
//! ```

pub mod config;
pub mod error;
pub mod processor;
pub mod scanner;
pub mod tree;
pub mod types;
pub mod writer;
