//! Configuration module for wkpdf.
//!
//! This module transforms CLI arguments into a validated, normalized configuration
//! that drives a single render. It handles:
//! - Validation of argument combinations
//! - Parsing of margins, orientation and `NAME=VALUE` assignments
//! - Application of page settings to a [`Document`]

use anyhow::{Context, Result, bail};

use crate::WkPdfError;
use crate::document::{Document, HeaderFooter};
use crate::process::{DEFAULT_PROGRAM, OutputLimits, RenderPipeline};
use crate::source::STDIO_TOKEN;
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Tall pages.
    #[default]
    Portrait,
    /// Wide pages.
    Landscape,
}

impl Orientation {
    /// Value passed to `--orientation`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = WkPdfError;

    /// Parse orientation from string.
    ///
    /// Accepts `portrait` / `landscape` in any case, or their first letter.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "p" | "portrait" => Ok(Self::Portrait),
            "l" | "landscape" => Ok(Self::Landscape),
            _ => Err(WkPdfError::InvalidConfig {
                message: format!("Invalid orientation: {s}. Must be one of: portrait, landscape"),
            }),
        }
    }
}

/// Page margins, one optional value per side.
///
/// A side left as `None` keeps whatever margin the document already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Margins {
    /// Top margin.
    pub top: Option<String>,
    /// Right margin.
    pub right: Option<String>,
    /// Bottom margin.
    pub bottom: Option<String>,
    /// Left margin.
    pub left: Option<String>,
}

impl Margins {
    /// Parse CSS margin shorthand.
    ///
    /// One to four whitespace separated lengths, in CSS order (top, right,
    /// bottom, left). A missing right or bottom copies top; a missing left
    /// copies right. Bare numbers are millimetres.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no values, more than four, or a value
    /// is not a length.
    ///
    /// # Examples
    ///
    /// ```
    /// use wkpdf::config::Margins;
    ///
    /// let margins = Margins::parse("10 1in").unwrap();
    /// assert_eq!(margins.top.as_deref(), Some("10mm"));
    /// assert_eq!(margins.right.as_deref(), Some("1in"));
    /// assert_eq!(margins.bottom.as_deref(), Some("10mm"));
    /// assert_eq!(margins.left.as_deref(), Some("1in"));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let values = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Result<Vec<_>>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [] => bail!("Margins cannot be empty"),
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
            [top, right, bottom, left] => (top, right, bottom, left),
            _ => bail!("Too many margin values: {s}. Expected 1 to 4"),
        };

        Ok(Self {
            top: Some(top.clone()),
            right: Some(right.clone()),
            bottom: Some(bottom.clone()),
            left: Some(left.clone()),
        })
    }

    /// `(side, value)` pairs for the sides that are set.
    pub fn sides(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("top", &self.top),
            ("right", &self.right),
            ("bottom", &self.bottom),
            ("left", &self.left),
        ]
        .into_iter()
        .filter_map(|(side, value)| value.as_deref().map(|value| (side, value)))
    }
}

/// Normalize one length: bare numbers become millimetres.
fn parse_length(value: &str) -> Result<String> {
    if !value.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        bail!("Invalid margin value: {value}");
    }

    if value.parse::<f64>().is_ok() {
        return Ok(format!("{value}mm"));
    }

    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .with_context(|| format!("Invalid margin value: {value}"))?;
    let (number, unit) = value.split_at(split);

    number
        .parse::<f64>()
        .with_context(|| format!("Invalid margin value: {value}"))?;

    if !unit.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("Invalid margin unit in {value}");
    }

    Ok(value.to_string())
}

/// Parse a `NAME=VALUE` or bare `NAME` argument.
///
/// The split happens at the first `=`, so values may contain `=` themselves.
///
/// # Examples
///
/// ```
/// use wkpdf::config::parse_assignment;
///
/// assert_eq!(
///     parse_assignment("zoom=1.5").unwrap(),
///     ("zoom".to_string(), Some("1.5".to_string()))
/// );
/// assert_eq!(parse_assignment("grayscale").unwrap(), ("grayscale".to_string(), None));
/// ```
pub fn parse_assignment(s: &str) -> Result<(String, Option<String>)> {
    let (name, value) = match s.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.to_string())),
        None => (s.trim(), None),
    };

    if name.is_empty() {
        bail!("Missing name in assignment: {s}");
    }

    Ok((name.to_string(), value))
}

/// Text and rule settings for the page header or footer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFooterText {
    /// Left-aligned text.
    pub left: Option<String>,
    /// Centered text.
    pub center: Option<String>,
    /// Right-aligned text.
    pub right: Option<String>,
    /// Draw a separator line.
    pub line: bool,
}

impl HeaderFooterText {
    /// Check if nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.center.is_none() && self.right.is_none() && !self.line
    }
}

/// Page layout settings applied to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    /// Paper size (A4, Letter, ...).
    pub page_size: Option<String>,
    /// Page orientation.
    pub orientation: Option<Orientation>,
    /// Page margins.
    pub margins: Option<Margins>,
    /// Output resolution.
    pub dpi: Option<u32>,
    /// PDF title.
    pub title: Option<String>,
    /// Generate a document outline.
    pub outline: bool,
    /// Print background colors and images.
    pub background: bool,
    /// Load and print images.
    pub images: bool,
    /// Render in grayscale.
    pub grayscale: bool,
    /// Extra style sheet applied to the document.
    pub user_style_sheet: Option<PathBuf>,
    /// Header text.
    pub header: HeaderFooterText,
    /// Footer text.
    pub footer: HeaderFooterText,
    /// `[name]` replacements in header/footer text.
    pub replacements: Vec<(String, String)>,
    /// Raw switches, applied last.
    pub switches: Vec<(String, Option<String>)>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            page_size: None,
            orientation: None,
            margins: None,
            dpi: None,
            title: None,
            outline: false,
            background: true,
            images: true,
            grayscale: false,
            user_style_sheet: None,
            header: HeaderFooterText::default(),
            footer: HeaderFooterText::default(),
            replacements: Vec::new(),
            switches: Vec::new(),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a render.
///
/// This structure contains all settings needed to produce one PDF,
/// derived and validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input: `-` for stdin, inline HTML, or a file path.
    pub input: String,

    /// Output PDF path (`-` for stdout).
    pub output: PathBuf,

    /// wkhtmltopdf executable (path or program name on `PATH`).
    pub binary: PathBuf,

    /// Dry run mode - print the command without running it.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Print machine-readable JSON instead of text.
    pub json: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Render timeout (None = wait forever).
    pub timeout: Option<Duration>,

    /// Bounds on captured child output.
    pub limits: OutputLimits,

    /// Page layout.
    pub page: PageSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: String::new(),
            output: PathBuf::new(),
            binary: PathBuf::from(DEFAULT_PROGRAM),
            dry_run: false,
            verbose: false,
            quiet: false,
            json: false,
            overwrite_mode: OverwriteMode::default(),
            timeout: None,
            limits: OutputLimits::default(),
            page: PageSettings::default(),
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies and invalid combinations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input is specified
    /// - Verbose and quiet modes are both enabled
    /// - The timeout is zero
    /// - The output path is the input file
    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            bail!("No input specified");
        }

        if self.output.as_os_str().is_empty() {
            bail!("No output specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(timeout) = self.timeout
            && timeout.is_zero()
        {
            bail!("Timeout must be at least 1 second");
        }

        if let Some(path) = self.input_path()
            && path == self.output
        {
            bail!(
                "Output file cannot be the same as the input file: {}",
                self.output.display()
            );
        }

        Ok(())
    }

    /// Input file path, when the input names a file.
    pub fn input_path(&self) -> Option<PathBuf> {
        if self.input == STDIO_TOKEN || self.input.starts_with('<') {
            None
        } else {
            Some(PathBuf::from(&self.input))
        }
    }

    /// Check if the PDF goes to standard output.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == STDIO_TOKEN
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }

    /// Render pipeline with the configured timeout and limits.
    pub fn pipeline(&self) -> RenderPipeline {
        let pipeline = RenderPipeline::new().with_limits(self.limits);
        match self.timeout {
            Some(timeout) => pipeline.with_timeout(timeout),
            None => pipeline,
        }
    }

    /// Apply the page settings to a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the user style sheet cannot be read.
    pub fn apply_to(&self, document: &mut Document) -> crate::Result<()> {
        let page = &self.page;

        if let Some(page_size) = &page.page_size {
            document.page_size(page_size);
        }
        if let Some(orientation) = page.orientation {
            document.orientation(orientation);
        }
        if let Some(margins) = &page.margins {
            document.margins(margins);
        }
        if let Some(dpi) = page.dpi {
            document.dpi(dpi);
        }
        if let Some(title) = &page.title {
            document.title(Some(title.as_str()));
        }

        document
            .outline(page.outline)
            .background(page.background)
            .images(page.images);

        if page.grayscale {
            document.set("grayscale", true);
        }
        if let Some(css) = &page.user_style_sheet {
            document.css_file(css)?;
        }

        if !page.header.is_empty() {
            apply_text(document.header(), &page.header);
        }
        if !page.footer.is_empty() {
            apply_text(document.footer(), &page.footer);
        }

        for (name, value) in &page.replacements {
            document.replace(name, Some(value.as_str()));
        }

        for (name, value) in &page.switches {
            match value {
                Some(value) => document.set(name, value),
                None => document.set(name, true),
            };
        }

        Ok(())
    }
}

fn apply_text(mut builder: HeaderFooter<'_>, text: &HeaderFooterText) {
    if let Some(left) = &text.left {
        builder = builder.left(left);
    }
    if let Some(center) = &text.center {
        builder = builder.center(center);
    }
    if let Some(right) = &text.right {
        builder = builder.right(right);
    }
    if text.line {
        builder = builder.line(true);
    }
    builder.end();
}
