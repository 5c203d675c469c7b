//! Pre-flight validation for wkpdf.
//!
//! Checks everything that can be checked before wkhtmltopdf is spawned:
//! - The executable resolves to an executable file
//! - A file input exists and is readable
//! - The output directory exists and is writable
//! - An existing output file is handled per the overwrite mode
//!
//! # Examples
//!
//! ```no_run
//! use wkpdf::config::Config;
//! use wkpdf::validation::Validator;
//!
//! # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
//! let summary = Validator::new().validate_config(&config).await?;
//! println!("Using {}", summary.executable.display());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{Config, OverwriteMode};
use crate::error::{Result, WkPdfError};
use crate::io::PdfWriter;
use crate::process::Executable;
use crate::source::{STDIO_TOKEN, Source};

/// Where the HTML comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    /// Read from standard input.
    Stdin,
    /// Markup given on the command line.
    Inline,
    /// An HTML file.
    File,
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Resolved executable path.
    pub executable: PathBuf,

    /// Kind of input.
    pub input_kind: InputKind,

    /// Canonical input path, for file inputs.
    pub input_path: Option<PathBuf>,

    /// Input size in bytes, when known before reading stdin.
    pub input_size: Option<u64>,

    /// Output path, `None` when writing to stdout.
    pub output: Option<PathBuf>,

    /// Whether the output file already exists.
    pub output_exists: bool,
}

/// Validator for render configuration.
#[derive(Debug, Clone, Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Resolve and check the configured executable.
    ///
    /// # Errors
    ///
    /// Returns `ExecutableNotFound` or `ExecutableNotExecutable`.
    pub fn validate_executable(&self, config: &Config) -> Result<Executable> {
        Executable::resolve(&config.binary)
    }

    /// Check the input without reading stdin.
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` or `SourceUnreadable` for bad file inputs.
    pub async fn validate_input(
        &self,
        config: &Config,
    ) -> Result<(InputKind, Option<PathBuf>, Option<u64>)> {
        if config.input == STDIO_TOKEN {
            return Ok((InputKind::Stdin, None, None));
        }

        match Source::detect(&config.input)? {
            Source::Html(html) => Ok((InputKind::Inline, None, Some(html.len() as u64))),
            Source::File(path) => {
                let size = tokio::fs::metadata(&path).await.map(|m| m.len()).ok();
                Ok((InputKind::File, Some(path), size))
            }
        }
    }

    /// Validate the output path.
    ///
    /// Checks if the output path is writable and handles overwrite scenarios.
    /// Prompting is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output file exists and no-clobber is set
    /// - Output directory doesn't exist
    /// - Output directory is not writable
    pub async fn validate_output(&self, config: &Config) -> Result<bool> {
        if config.writes_to_stdout() {
            return Ok(false);
        }

        let output = &config.output;
        let writer = PdfWriter::new();
        let exists = writer.exists(output).await;

        if exists && config.overwrite_mode == OverwriteMode::NoClobber {
            return Err(WkPdfError::output_exists(output.clone()));
        }

        if tokio::fs::metadata(output)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
        {
            return Err(WkPdfError::invalid_config(format!(
                "Output path is a directory: {}",
                output.display()
            )));
        }

        writer.can_write(output).await?;
        Ok(exists)
    }

    /// Validate the complete configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any check fails, or if the output resolves to
    /// the input file.
    pub async fn validate_config(&self, config: &Config) -> Result<ValidationSummary> {
        let executable = self.validate_executable(config)?;
        let (input_kind, input_path, input_size) = self.validate_input(config).await?;
        let output_exists = self.validate_output(config).await?;

        if let Some(input) = &input_path
            && output_exists
            && config.output.canonicalize().is_ok_and(|output| &output == input)
        {
            return Err(WkPdfError::invalid_config(format!(
                "Output file cannot be the same as the input file: {}",
                config.output.display()
            )));
        }

        Ok(ValidationSummary {
            executable: executable.path().to_path_buf(),
            input_kind,
            input_path,
            input_size,
            output: (!config.writes_to_stdout()).then(|| config.output.clone()),
            output_exists,
        })
    }
}
