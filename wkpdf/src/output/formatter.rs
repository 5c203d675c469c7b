//! Message formatting and display.
//!
//! This module provides formatted output for different message types
//! with support for quiet and verbose modes. When the PDF itself goes to
//! stdout, messages are written to stderr instead.
//!
//! # Examples
//!
//! ```
//! use wkpdf::output::formatter::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Rendering page.html...");
//! formatter.success("Render completed");
//! formatter.error("Something went wrong");
//! ```

use crate::config::Config;
use std::io::{self, IsTerminal, Write};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn decoration(self) -> (&'static str, &'static str) {
        match self {
            Self::Info => ("", ""),
            Self::Success => ("✓ ", "\x1b[32m"), // Green
            Self::Warning => ("⚠ ", "\x1b[33m"), // Yellow
            Self::Error => ("✗ ", "\x1b[31m"),   // Red
            Self::Debug => ("→ ", "\x1b[36m"),   // Cyan
        }
    }
}

/// Stream the formatter writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    /// Whether to suppress non-error output.
    quiet: bool,
    /// Whether to show verbose output.
    verbose: bool,
    /// Whether to use colored output.
    colored: bool,
    /// Where messages go.
    target: Target,
}

impl OutputFormatter {
    /// Create a new output formatter writing to stdout.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self::with_target(quiet, verbose, Target::Stdout)
    }

    /// Create a formatter writing to a specific stream.
    pub fn with_target(quiet: bool, verbose: bool, target: Target) -> Self {
        Self {
            quiet,
            verbose,
            colored: Self::should_use_color(target),
            target,
        }
    }

    /// Create a formatter from configuration.
    ///
    /// Messages go to stderr when the PDF is written to stdout.
    pub fn from_config(config: &Config) -> Self {
        let target = if config.writes_to_stdout() {
            Target::Stderr
        } else {
            Target::Stdout
        };
        Self::with_target(config.quiet, config.verbose, target)
    }

    /// Create a quiet formatter (only errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Create a verbose formatter.
    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    /// Returns true if the target is a TTY and TERM is set.
    fn should_use_color(target: Target) -> bool {
        let terminal = match target {
            Target::Stdout => io::stdout().is_terminal(),
            Target::Stderr => io::stderr().is_terminal(),
        };
        terminal && std::env::var("TERM").is_ok()
    }

    /// Print an informational message.
    ///
    /// Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message.
    ///
    /// Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message.
    ///
    /// Always displayed (even in quiet mode).
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message.
    ///
    /// Always displayed.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a debug/verbose message.
    ///
    /// Only displayed in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    /// Print a message with level-appropriate formatting.
    fn print_message(&self, level: MessageLevel, message: &str) {
        let (prefix, color_code) = level.decoration();
        let reset = "\x1b[0m";

        if self.colored && !color_code.is_empty() {
            self.write_line(&format!("{color_code}{prefix}{message}{reset}"));
        } else {
            self.write_line(&format!("{prefix}{message}"));
        }
    }

    /// Print a section header.
    ///
    /// Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            self.write_line(&format!("\n{title}"));
        }
    }

    /// Print a labelled detail line.
    ///
    /// Only shown in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            self.write_line(&format!("  {label}: {value}"));
        }
    }

    /// Print unformatted text, even in quiet mode.
    ///
    /// Used for dry-run output that is the point of the invocation.
    pub fn raw(&self, text: &str) {
        self.write_line(text);
    }

    fn write_line(&self, line: &str) {
        // Ignore write errors such as a closed pipe.
        let _ = match self.target {
            Target::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Target::Stderr => writeln!(io::stderr().lock(), "{line}"),
        };
    }

    /// Check if output should be shown.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Check if verbose output should be shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Stream messages are written to.
    pub fn target(&self) -> Target {
        self.target
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
