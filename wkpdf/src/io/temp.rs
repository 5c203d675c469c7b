//! Content-addressed temporary files.
//!
//! Style sheets and header/footer HTML can be handed to wkhtmltopdf as
//! files instead of data URIs. The pool names each file after the SHA-256 of
//! its contents, so the same content is only written once, and removes the
//! whole directory when it is dropped.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::error::{Result, WkPdfError};

/// A directory of temporary files that lives as long as the pool.
#[derive(Debug)]
pub struct TempFilePool {
    dir: TempDir,
    files: Mutex<HashMap<String, PathBuf>>,
}

impl TempFilePool {
    /// Create a pool in the system temp directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("wkpdf-")
            .tempdir()
            .map_err(|source| WkPdfError::TempFile { source })?;
        Ok(Self::with_dir(dir))
    }

    /// Create a pool inside a specific directory.
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("wkpdf-")
            .tempdir_in(parent)
            .map_err(|source| WkPdfError::TempFile { source })?;
        Ok(Self::with_dir(dir))
    }

    fn with_dir(dir: TempDir) -> Self {
        Self {
            dir,
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the pooled files.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Store `contents` and return the path of the file holding them.
    ///
    /// Identical contents with the same extension map to the same file.
    pub fn create(&self, contents: &[u8], extension: &str) -> Result<PathBuf> {
        let file_name = format!("{}.{extension}", hex::encode(Sha256::digest(contents)));

        let mut files = self
            .files
            .lock()
            .map_err(|_| WkPdfError::other("temp file pool lock poisoned"))?;

        if let Some(path) = files.get(&file_name) {
            return Ok(path.clone());
        }

        let path = self.dir.path().join(&file_name);
        std::fs::write(&path, contents).map_err(|source| WkPdfError::TempFile { source })?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote temp file");

        files.insert(file_name, path.clone());
        Ok(path)
    }

    /// Number of files in the pool.
    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    /// Whether the pool holds no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
