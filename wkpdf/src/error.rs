//! Error types for wkpdf.
//!
//! This module defines all error types that can occur while preparing and
//! running a wkhtmltopdf render. Errors carry enough context to act on:
//! the path that could not be used, the exit code of the child process and
//! the complete diagnostic text it wrote to stderr.
//!
//! # Error Categories
//!
//! - **Resolution Errors**: executable missing or not executable
//! - **Source Errors**: HTML input missing or unreadable
//! - **Process Errors**: spawn failures, non-zero exits, timeouts, output bounds
//! - **Output Errors**: writing the PDF or temp files failed

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::process::StreamKind;

/// Result type alias for wkpdf operations.
pub type Result<T> = std::result::Result<T, WkPdfError>;

/// Main error type for wkpdf operations.
#[derive(Debug, thiserror::Error)]
pub enum WkPdfError {
    /// The wkhtmltopdf executable could not be found.
    #[error(
        "wkhtmltopdf executable not found: {}\n  \
         Hint: install wkhtmltopdf or pass its location with --binary",
        .path.display()
    )]
    ExecutableNotFound {
        /// Path (or bare program name) that was looked up.
        path: PathBuf,
    },

    /// The executable exists but lacks execute permission.
    #[error("File is not executable: {}", .path.display())]
    ExecutableNotExecutable {
        /// Path to the file.
        path: PathBuf,
    },

    /// The HTML source file does not exist.
    #[error("Source file not found: {}", .path.display())]
    SourceNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The HTML source file exists but cannot be read.
    #[error("Cannot read source file: {}\n  Reason: {source}", .path.display())]
    SourceUnreadable {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A render was requested before any source was set.
    #[error("No HTML source has been set on the document")]
    MissingSource,

    /// The operating system refused to create the child process.
    #[error("Failed to start {}\n  Reason: {source}", .path.display())]
    ProcessSpawn {
        /// Executable that was being spawned.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// wkhtmltopdf ran but exited with a non-zero status.
    #[error("wkhtmltopdf exited with code {exit_code}\n{stderr}")]
    RenderFailed {
        /// Exit code reported by the child.
        exit_code: i32,
        /// Everything the child wrote to stderr.
        stderr: String,
    },

    /// The render exceeded its deadline. The child has been killed.
    #[error("wkhtmltopdf did not finish within {timeout:?} and was terminated")]
    Timeout {
        /// Deadline that expired.
        timeout: Duration,
    },

    /// The child produced more output than allowed. The child has been killed.
    #[error("wkhtmltopdf wrote more than {limit} bytes to {stream} and was terminated")]
    OutputLimitExceeded {
        /// Stream that overflowed.
        stream: StreamKind,
        /// Configured bound in bytes.
        limit: usize,
    },

    /// Reading from one of the child's pipes failed.
    #[error("Failed to read wkhtmltopdf {stream}: {source}")]
    StreamRead {
        /// Stream being read.
        stream: StreamKind,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A temporary file for a style sheet or header/footer could not be written.
    #[error("Failed to write temporary file: {source}")]
    TempFile {
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for WkPdfError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl WkPdfError {
    /// Create an ExecutableNotFound error.
    pub fn executable_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ExecutableNotFound { path: path.into() }
    }

    /// Create an ExecutableNotExecutable error.
    pub fn executable_not_executable(path: impl Into<PathBuf>) -> Self {
        Self::ExecutableNotExecutable { path: path.into() }
    }

    /// Create a SourceNotFound error.
    pub fn source_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create a RenderFailed error.
    pub fn render_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::RenderFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: impl Into<PathBuf>) -> Self {
        Self::OutputExists { path: path.into() }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Diagnostic text captured from wkhtmltopdf, if this error carries any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::RenderFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Check if this error happened before any process was started.
    ///
    /// Returns true for resolution and configuration failures, which
    /// retrying cannot fix.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ExecutableNotFound { .. }
                | Self::ExecutableNotExecutable { .. }
                | Self::SourceNotFound { .. }
                | Self::SourceUnreadable { .. }
                | Self::MissingSource
                | Self::ProcessSpawn { .. }
                | Self::InvalidConfig { .. }
                | Self::Cancelled
        )
    }

    /// Get the exit code for this error.
    ///
    /// Returns the appropriate process exit code based on error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExecutableNotFound { .. } => 2,
            Self::ExecutableNotExecutable { .. } => 2,
            Self::SourceNotFound { .. } => 2,
            Self::SourceUnreadable { .. } => 2,
            Self::MissingSource => 1,
            Self::ProcessSpawn { .. } => 5,
            Self::RenderFailed { .. } => 3,
            Self::Timeout { .. } => 124, // Same as timeout(1)
            Self::OutputLimitExceeded { .. } => 3,
            Self::StreamRead { .. } => 5,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::TempFile { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
