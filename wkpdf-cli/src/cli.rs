//! CLI argument parsing for wkpdf.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation. The
//! build script includes this file to generate the man page, so it only
//! depends on `clap` and the `wkpdf` library.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use wkpdf::config::{
    Config, HeaderFooterText, Margins, Orientation, OverwriteMode, PageSettings, parse_assignment,
};
use wkpdf::error::{Result, WkPdfError};
use wkpdf::process::{DEFAULT_PROGRAM, OutputLimits};

/// Render HTML to PDF with wkhtmltopdf.
///
/// wkpdf builds a wkhtmltopdf command line from typed options, streams the
/// HTML to it and writes the resulting PDF. Inline markup, files and stdin
/// are accepted as input.
#[derive(Parser, Debug)]
#[command(name = "wkpdf")]
#[command(version)]
#[command(about = "Render HTML to PDF with wkhtmltopdf", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// HTML input: a file path, inline markup starting with '<', or '-' for stdin
    ///
    /// Examples:
    ///   wkpdf page.html -o page.pdf
    ///   wkpdf '<h1>Hello</h1>' -o hello.pdf
    ///   cat page.html | wkpdf - -o page.pdf
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Output PDF file path ('-' for stdout)
    ///
    /// Use --force to overwrite existing files without confirmation.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// wkhtmltopdf executable, as a path or a program name on PATH
    #[arg(long, value_name = "PATH", env = "WKHTMLTOPDF_BINARY", default_value = DEFAULT_PROGRAM)]
    pub binary: PathBuf,

    /// Dry run - print the wkhtmltopdf command without running it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show resolved paths, sizes and timings
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Kill wkhtmltopdf after this many seconds (0 disables the limit)
    #[arg(long, value_name = "SECONDS", default_value_t = 300)]
    pub timeout: u64,

    /// Largest PDF accepted from wkhtmltopdf, in MiB
    #[arg(long, value_name = "MIB")]
    pub max_output: Option<usize>,

    /// Paper size (A4, Letter, Legal, ...)
    #[arg(short = 's', long, value_name = "SIZE")]
    pub page_size: Option<String>,

    /// Page orientation (portrait or landscape)
    #[arg(short = 'O', long, value_name = "ORIENTATION")]
    pub orientation: Option<String>,

    /// Margins in CSS shorthand; bare numbers are millimetres
    ///
    /// Examples:
    ///   --margins 10            # 10mm on every side
    ///   --margins "10 20"       # 10mm top/bottom, 20mm left/right
    ///   --margins "1in 0.5in 1in 0.5in"
    #[arg(short, long, value_name = "CSS")]
    pub margins: Option<String>,

    /// Output resolution (default 300)
    #[arg(long, value_name = "DPI")]
    pub dpi: Option<u32>,

    /// PDF title
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Generate a document outline
    #[arg(long)]
    pub outline: bool,

    /// Do not print background colors and images
    #[arg(long)]
    pub no_background: bool,

    /// Do not load or print images
    #[arg(long)]
    pub no_images: bool,

    /// Render in grayscale
    #[arg(short, long)]
    pub grayscale: bool,

    /// Extra style sheet applied to the document
    #[arg(long, value_name = "FILE")]
    pub css: Option<PathBuf>,

    /// Left header text ([page], [topage], [date], [title], ... are substituted)
    #[arg(long, value_name = "TEXT")]
    pub header_left: Option<String>,

    /// Centered header text
    #[arg(long, value_name = "TEXT")]
    pub header_center: Option<String>,

    /// Right header text
    #[arg(long, value_name = "TEXT")]
    pub header_right: Option<String>,

    /// Draw a line below the header
    #[arg(long)]
    pub header_line: bool,

    /// Left footer text
    #[arg(long, value_name = "TEXT")]
    pub footer_left: Option<String>,

    /// Centered footer text
    #[arg(long, value_name = "TEXT")]
    pub footer_center: Option<String>,

    /// Right footer text
    #[arg(long, value_name = "TEXT")]
    pub footer_right: Option<String>,

    /// Draw a line above the footer
    #[arg(long)]
    pub footer_line: bool,

    /// Replace [NAME] with VALUE in header and footer text (repeatable)
    #[arg(long = "replace", value_name = "NAME=VALUE")]
    pub replacements: Vec<String>,

    /// Pass any wkhtmltopdf switch through (repeatable)
    ///
    /// Names may be given in camelCase or kebab-case, without dashes.
    ///
    /// Examples:
    ///   --switch zoom=1.25
    ///   --switch enableLocalFileAccess
    #[arg(long = "switch", value_name = "NAME[=VALUE]")]
    pub switches: Vec<String>,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Orientation or margins cannot be parsed
    /// - A replacement is not `NAME=VALUE`
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        // Determine overwrite mode
        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let orientation = self
            .orientation
            .as_deref()
            .map(Orientation::from_str)
            .transpose()?;

        let margins = self
            .margins
            .as_deref()
            .map(Margins::parse)
            .transpose()
            .map_err(|e| WkPdfError::invalid_config(e.to_string()))?;

        let replacements = self
            .replacements
            .iter()
            .map(String::as_str)
            .map(parse_replacement)
            .collect::<Result<Vec<_>>>()?;

        let switches = self
            .switches
            .iter()
            .map(|raw| parse_assignment(raw).map_err(|e| WkPdfError::invalid_config(e.to_string())))
            .collect::<Result<Vec<_>>>()?;

        let mut limits = OutputLimits::default();
        if let Some(mib) = self.max_output {
            limits.stdout = Some(mib.saturating_mul(1024 * 1024));
        }

        let page = PageSettings {
            page_size: self.page_size.clone(),
            orientation,
            margins,
            dpi: self.dpi,
            title: self.title.clone(),
            outline: self.outline,
            background: !self.no_background,
            images: !self.no_images,
            grayscale: self.grayscale,
            user_style_sheet: self.css.clone(),
            header: HeaderFooterText {
                left: self.header_left.clone(),
                center: self.header_center.clone(),
                right: self.header_right.clone(),
                line: self.header_line,
            },
            footer: HeaderFooterText {
                left: self.footer_left.clone(),
                center: self.footer_center.clone(),
                right: self.footer_right.clone(),
                line: self.footer_line,
            },
            replacements,
            switches,
        };

        // Build config
        let config = Config {
            input: self.input.clone(),
            output: self.output.clone(),
            binary: self.binary.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            json: self.json,
            overwrite_mode,
            timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
            limits,
            page,
        };

        // Validate the configuration
        config.validate().map_err(|e| {
            WkPdfError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// Performs early validation that doesn't require file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(WkPdfError::invalid_config("No input specified"));
        }

        if let Some(mib) = self.max_output
            && mib == 0
        {
            return Err(WkPdfError::invalid_config(
                "Maximum output size must be at least 1 MiB",
            ));
        }

        Ok(())
    }
}

/// Parse `NAME=VALUE`; the value may be empty but the `=` is required.
fn parse_replacement(raw: &str) -> Result<(String, String)> {
    match parse_assignment(raw) {
        Ok((name, Some(value))) => Ok((name, value)),
        Ok((name, None)) => Err(WkPdfError::invalid_config(format!(
            "Replacement '{name}' needs a value: --replace {name}=VALUE"
        ))),
        Err(e) => Err(WkPdfError::invalid_config(e.to_string())),
    }
}
