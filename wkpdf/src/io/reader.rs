//! Source loading for the command line.
//!
//! An input argument is one of:
//! - `-`: HTML read from standard input
//! - inline markup starting with `<`
//! - a path to an HTML file
//!
//! # Examples
//!
//! ```no_run
//! use wkpdf::io::reader::SourceReader;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = SourceReader::new().load("index.html").await?;
//! println!("Loaded {} bytes in {:?}", loaded.size, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Result, WkPdfError};
use crate::source::{STDIO_TOKEN, Source};

/// A resolved source with load metadata.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// The source handed to the document.
    pub source: Source,

    /// HTML size in bytes (file size for file sources).
    pub size: u64,

    /// Time taken to resolve the source.
    pub load_time: Duration,
}

/// Resolves input arguments into sources.
#[derive(Debug, Clone, Default)]
pub struct SourceReader {
    /// Reject empty HTML payloads.
    allow_empty: bool,
}

impl SourceReader {
    /// Create a reader that rejects empty payloads.
    pub fn new() -> Self {
        Self { allow_empty: false }
    }

    /// Create a reader that accepts empty payloads.
    pub fn allow_empty() -> Self {
        Self { allow_empty: true }
    }

    /// Resolve an input argument.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - stdin cannot be read
    /// - stdin is empty and empty payloads are rejected
    /// - the file does not exist or is unreadable
    pub async fn load(&self, input: &str) -> Result<LoadedSource> {
        if input == STDIO_TOKEN {
            return self.load_from(tokio::io::stdin()).await;
        }

        let start = Instant::now();
        let source = Source::detect(input)?;
        let size = match &source {
            Source::Html(html) => html.len() as u64,
            Source::File(path) => tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0),
        };

        Ok(LoadedSource {
            source,
            size,
            load_time: start.elapsed(),
        })
    }

    /// Read an HTML payload from any async reader.
    pub async fn load_from<R>(&self, mut reader: R) -> Result<LoadedSource>
    where
        R: AsyncRead + Unpin,
    {
        let start = Instant::now();
        let mut html = Vec::new();
        reader.read_to_end(&mut html).await?;

        if html.is_empty() && !self.allow_empty {
            return Err(WkPdfError::MissingSource);
        }

        tracing::debug!(bytes = html.len(), "read HTML payload");

        Ok(LoadedSource {
            size: html.len() as u64,
            source: Source::html(html),
            load_time: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_inline_html() {
        let loaded = SourceReader::new().load("<h1>Title</h1>").await.unwrap();

        assert_eq!(loaded.size, 14);
        assert_eq!(loaded.source.payload(), Some(&b"<h1>Title</h1>"[..]));
    }

    #[tokio::test]
    async fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("page.html");
        std::fs::write(&path, "<p>file</p>").unwrap();

        let loaded = SourceReader::new()
            .load(path.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(loaded.size, 11);
        assert!(loaded.source.path().unwrap().is_absolute());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = SourceReader::new()
            .load("/nonexistent/page.html")
            .await
            .unwrap_err();
        assert!(matches!(err, WkPdfError::SourceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_from_reader() {
        let loaded = SourceReader::new()
            .load_from(&b"<p>piped</p>"[..])
            .await
            .unwrap();

        assert_eq!(loaded.size, 12);
        assert_eq!(loaded.source.token(), "-");
    }

    #[tokio::test]
    async fn test_empty_payload() {
        let err = SourceReader::new().load_from(&b""[..]).await.unwrap_err();
        assert!(matches!(err, WkPdfError::MissingSource));

        let loaded = SourceReader::allow_empty().load_from(&b""[..]).await.unwrap();
        assert_eq!(loaded.size, 0);
    }
}
