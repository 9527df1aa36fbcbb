/// Configuration system for ctxpack
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, PackError, ValidationError};
use crate::processor::ProcessorOptions;
use crate::types::{OutputFormat, ScanOptions};
use crate::writer::WriterOptions;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Scanner configuration
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Content processing configuration
    #[serde(default)]
    pub processor: ProcessorConfig,

    /// Output writer configuration
    #[serde(default)]
    pub writer: WriterConfig,
}

/// Scanner configuration
///
/// Numeric fields are signed so that a negative value in a hand-edited
/// config file is caught by [`Config::validate`] instead of wrapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Ignore patterns: glob, substring, or `dir/*` wildcard
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Maximum file size to scan (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: i64,

    /// Maximum number of files to hand to the worker pool (0 = unlimited)
    #[serde(default = "default_max_files")]
    pub max_files: i64,

    /// Worker pool size (0 = default)
    #[serde(default = "default_workers")]
    pub workers: i64,
}

/// Content processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Chunk window size in bytes
    #[serde(default = "default_chunk_size")]
    pub max_chunk_size: i64,

    /// Overlap between consecutive chunks in bytes
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: i64,

    /// Approximate token budget per file
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,

    /// Strip comments from recognized languages
    #[serde(default)]
    pub strip_comments: bool,
}

/// Output writer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Output file path; empty means a fresh random name per run
    #[serde(default)]
    pub output_path: String,

    /// Output format: "xml", "json", or "yaml"
    #[serde(default = "default_format")]
    pub format: String,

    /// Pretty-print structured output
    #[serde(default = "default_pretty_print")]
    pub pretty_print: bool,
}

// Default value functions
fn default_ignore_patterns() -> Vec<String> {
    [
        ".next",
        "webpack",
        ".contentlayer",
        ".git",
        "node_modules",
        ".idea",
        "vendor",
        "*.exe",
        "*.dll",
        "*.so",
        "*.dylib",
        "*.bin",
        "*.dat",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_file_size() -> i64 {
    1_048_576 // 1 MB
}

fn default_max_files() -> i64 {
    1000
}

fn default_workers() -> i64 {
    crate::scanner::DEFAULT_WORKER_COUNT as i64
}

fn default_chunk_size() -> i64 {
    crate::processor::DEFAULT_CHUNK_SIZE as i64
}

fn default_chunk_overlap() -> i64 {
    200
}

fn default_max_tokens() -> i64 {
    2000
}

fn default_format() -> String {
    "xml".to_string()
}

fn default_pretty_print() -> bool {
    true
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: default_ignore_patterns(),
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
            workers: default_workers(),
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_tokens: default_max_tokens(),
            strip_comments: false,
        }
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            output_path: String::new(),
            format: default_format(),
            pretty_print: default_pretty_print(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|err| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: err,
        })?;

        serde_json::from_str(&content)
            .map_err(|err| ConfigError::ParseFailed(format!("invalid JSON: {}", err)))
    }

    /// Load configuration from the given path (or the default location),
    /// falling back to defaults when no file exists.
    pub fn load(path: Option<&Path>) -> Result<Self, PackError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        let mut config = if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)?
        } else {
            tracing::info!("No config file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                source: err,
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|err| ConfigError::ParseFailed(format!("serializing config: {}", err)))?;

        std::fs::write(path, content).map_err(|err| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            source: err,
        })?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Default config file location under the platform config directory.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ctxpack")
            .join("config.json")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.scanner.max_file_size < 0 {
            return Err(ValidationError::negative(
                "scanner.maxFileSize",
                self.scanner.max_file_size,
            ));
        }
        if self.scanner.max_files < 0 {
            return Err(ValidationError::negative(
                "scanner.maxFiles",
                self.scanner.max_files,
            ));
        }
        if self.scanner.workers < 0 {
            return Err(ValidationError::negative(
                "scanner.workers",
                self.scanner.workers,
            ));
        }
        if self.processor.max_chunk_size < 0 {
            return Err(ValidationError::negative(
                "processor.maxChunkSize",
                self.processor.max_chunk_size,
            ));
        }
        if self.processor.chunk_overlap < 0 {
            return Err(ValidationError::negative(
                "processor.chunkOverlap",
                self.processor.chunk_overlap,
            ));
        }
        if self.processor.max_tokens < 0 {
            return Err(ValidationError::negative(
                "processor.maxTokens",
                self.processor.max_tokens,
            ));
        }

        self.writer.format.parse::<OutputFormat>()?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CTXPACK_OUTPUT") {
            self.writer.output_path = path;
        }

        if let Ok(format) = std::env::var("CTXPACK_FORMAT") {
            self.writer.format = format;
        }

        if let Ok(size) = std::env::var("CTXPACK_MAX_FILE_SIZE") {
            if let Ok(size) = size.parse() {
                self.scanner.max_file_size = size;
            }
        }
    }

    /// Scanner options derived from this config.
    pub fn scan_options(&self, root: &Path) -> ScanOptions {
        ScanOptions {
            root_dir: root.to_path_buf(),
            ignore_patterns: self.scanner.ignore_patterns.clone(),
            max_file_size: self.scanner.max_file_size as u64,
            max_files: self.scanner.max_files as usize,
        }
    }

    /// Processor options derived from this config.
    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions {
            max_chunk_size: self.processor.max_chunk_size as usize,
            chunk_overlap: self.processor.chunk_overlap as usize,
            max_tokens: self.processor.max_tokens as usize,
            strip_comments: self.processor.strip_comments,
        }
    }

    /// Writer options derived from this config. An empty `output_path`
    /// becomes a fresh random file name in the current directory.
    pub fn writer_options(&self) -> Result<WriterOptions, ValidationError> {
        let format: OutputFormat = self.writer.format.parse()?;
        let output_path = if self.writer.output_path.is_empty() {
            PathBuf::from(random_output_name(format))
        } else {
            PathBuf::from(&self.writer.output_path)
        };
        Ok(WriterOptions {
            output_path,
            format,
            pretty_print: self.writer.pretty_print,
        })
    }
}

/// A collision-resistant default artifact name, e.g. `ctxpack_3f9a...e2.xml`.
fn random_output_name(format: OutputFormat) -> String {
    format!("ctxpack_{:016x}{}", rand::random::<u64>(), format.extension())
}
