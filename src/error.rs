/// Centralized error types for ctxpack using thiserror
///
/// Provides domain-specific error types for better error handling and user-facing messages.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the packing pipeline
#[derive(Error, Debug)]
pub enum PackError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Writer error: {0}")]
    Write(#[from] WriteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced on the scan error stream
///
/// All of these are recoverable: the offending path is skipped and the scan
/// keeps going.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("walk error at {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stat error for {path:?}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("binary check error for {path:?}: {source}")]
    Classify {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path {path:?} is not under the scan root")]
    OutsideRoot { path: PathBuf },
}

impl ScanError {
    /// The path this error was reported for.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ScanError::Walk { path, .. }
            | ScanError::Stat { path, .. }
            | ScanError::Classify { path, .. }
            | ScanError::OutsideRoot { path } => path,
        }
    }
}

/// Errors related to content processing
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("reading file {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("entry '{0}' is not eligible for processing")]
    NotEligible(String),
}

/// Errors related to output writing
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("output path cannot be empty")]
    EmptyOutputPath,

    #[error("content path cannot be empty")]
    EmptyContentPath,

    #[error("creating output file {path:?}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing {format} content: {reason}")]
    EncodeFailed { format: String, reason: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config file {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file: {0}")]
    ParseFailed(String),

    #[error("saving config file {path:?}: {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to input validation
///
/// These fail fast at construction time rather than surfacing mid-scan.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{field} must be non-negative, got {actual}")]
    Negative { field: String, actual: i64 },

    #[error("{field} must be greater than zero")]
    Zero { field: String },

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl ValidationError {
    pub fn negative(field: impl Into<String>, actual: i64) -> Self {
        ValidationError::Negative {
            field: field.into(),
            actual,
        }
    }

    pub fn zero(field: impl Into<String>) -> Self {
        ValidationError::Zero {
            field: field.into(),
        }
    }
}

// Conversion from anyhow::Error to PackError
impl From<anyhow::Error> for PackError {
    fn from(err: anyhow::Error) -> Self {
        PackError::Other(format!("{:#}", err))
    }
}

impl PackError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        PackError::Other(msg.into())
    }

    /// Check if this is a user error (validation, bad config) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(self, PackError::Validation(_) | PackError::Config(_))
    }
}
