//! Resolution of the wkhtmltopdf executable.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, WkPdfError};

/// Default program name looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "wkhtmltopdf";

/// A verified, absolute path to an executable file.
///
/// Resolve once and hand the value to every pipeline that needs it; it is
/// immutable afterwards and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    path: PathBuf,
}

impl Executable {
    /// Resolve and verify an executable.
    ///
    /// A bare program name (no path separator) is looked up in the
    /// directories listed in `PATH`. Anything else is treated as a path,
    /// relative paths being resolved against the working directory.
    ///
    /// # Errors
    ///
    /// Returns `ExecutableNotFound` if no regular file exists at the
    /// location, or `ExecutableNotExecutable` if it lacks execute permission.
    pub fn resolve(program: impl AsRef<Path>) -> Result<Self> {
        let program = program.as_ref();

        if program.components().count() == 1 && !program.has_root() {
            return Self::search_path(program);
        }

        Self::verify(program)
    }

    /// Path to the executable.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn search_path(program: &Path) -> Result<Self> {
        let Some(paths) = env::var_os("PATH") else {
            return Err(WkPdfError::executable_not_found(program));
        };

        let mut not_executable = None;

        for dir in env::split_paths(&paths) {
            let candidate = dir.join(program);
            match Self::verify(&candidate) {
                Ok(executable) => return Ok(executable),
                Err(err @ WkPdfError::ExecutableNotExecutable { .. }) => {
                    not_executable.get_or_insert(err);
                }
                Err(_) => {}
            }
        }

        Err(not_executable.unwrap_or_else(|| WkPdfError::executable_not_found(program)))
    }

    fn verify(candidate: &Path) -> Result<Self> {
        let metadata = match candidate.metadata() {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return Err(WkPdfError::executable_not_found(candidate)),
        };

        if !is_executable(&metadata) {
            return Err(WkPdfError::executable_not_executable(candidate));
        }

        let path = candidate
            .canonicalize()
            .map_err(|_| WkPdfError::executable_not_found(candidate))?;

        Ok(Self { path })
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}
