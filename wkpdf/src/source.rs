//! HTML input for a render.
//!
//! A source is either an in-memory HTML payload, streamed to wkhtmltopdf on
//! stdin, or a file that wkhtmltopdf opens itself.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, WkPdfError};

/// Input token telling wkhtmltopdf to read from stdin (and, as output token,
/// to write to stdout).
pub const STDIO_TOKEN: &str = "-";

/// HTML input for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Inline HTML bytes written to the child's stdin.
    Html(Arc<[u8]>),
    /// Absolute path of an HTML file.
    File(PathBuf),
}

impl Source {
    /// Create a source from inline HTML.
    pub fn html(html: impl Into<Vec<u8>>) -> Self {
        Self::Html(Arc::from(html.into()))
    }

    /// Create a source from an HTML file.
    ///
    /// The file must exist and be readable; it is stored as an absolute,
    /// canonical path so the render does not depend on the working directory.
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` if the path is not an existing file, or
    /// `SourceUnreadable` if it cannot be opened for reading.
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(WkPdfError::source_not_found(path));
        }

        let canonical = path
            .canonicalize()
            .map_err(|source| WkPdfError::SourceUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        File::open(&canonical).map_err(|source| WkPdfError::SourceUnreadable {
            path: canonical.clone(),
            source,
        })?;

        Ok(Self::File(canonical))
    }

    /// Guess the kind of source from a string.
    ///
    /// Strings whose first character is `<` are HTML; anything else must
    /// name an existing file, so leading whitespace makes it a path.
    pub fn detect(input: &str) -> Result<Self> {
        if input.starts_with('<') {
            Ok(Self::html(input))
        } else {
            Self::file(input)
        }
    }

    /// Token passed to wkhtmltopdf as the input argument.
    pub fn token(&self) -> OsString {
        match self {
            Self::Html(_) => OsString::from(STDIO_TOKEN),
            Self::File(path) => path.clone().into_os_string(),
        }
    }

    /// Bytes to feed on stdin, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Html(html) => Some(&html[..]),
            Self::File(_) => None,
        }
    }

    /// Path of a file source.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path.as_path()),
            Self::Html(_) => None,
        }
    }
}
