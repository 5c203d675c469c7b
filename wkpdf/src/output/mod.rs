//! Output formatting and display for wkpdf.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - Dry-run command previews
//! - Summary reports
//! - Quiet and verbose modes
//!
//! Library diagnostics go through `tracing`; this module is for messages the
//! user asked for.
//!
//! # Examples
//!
//! ```no_run
//! use wkpdf::output::OutputFormatter;
//! use wkpdf::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Rendering");
//! formatter.success("Render completed successfully");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter, Target};

use crate::command::CommandPreview;
use crate::io::WriteStatistics;
use crate::validation::{InputKind, ValidationSummary};

/// Create an output formatter from configuration.
pub fn create_formatter(config: &crate::config::Config) -> OutputFormatter {
    OutputFormatter::from_config(config)
}

/// Display validation summary to the user.
pub fn display_validation_summary(formatter: &OutputFormatter, summary: &ValidationSummary) {
    formatter.detail("Executable", &summary.executable.display().to_string());

    let input = match (summary.input_kind, &summary.input_path) {
        (InputKind::File, Some(path)) => path.display().to_string(),
        (InputKind::Stdin, _) => "stdin".to_string(),
        _ => "inline HTML".to_string(),
    };
    formatter.detail("Input", &input);

    if let Some(size) = summary.input_size {
        formatter.detail("Input size", &crate::io::format_file_size(size));
    }

    match &summary.output {
        Some(output) if summary.output_exists => {
            formatter.detail("Output", &format!("{} (exists)", output.display()));
        }
        Some(output) => formatter.detail("Output", &output.display().to_string()),
        None => formatter.detail("Output", "stdout"),
    }
}

/// Display the command a render would run.
pub fn display_command(formatter: &OutputFormatter, preview: &CommandPreview) {
    formatter.raw(&preview.command_line);

    if let Some(bytes) = preview.stdin_bytes {
        formatter.debug(&format!(
            "HTML payload of {} is written to stdin",
            crate::io::format_file_size(bytes as u64)
        ));
    }
}

/// Display write statistics to the user.
pub fn display_write_statistics(formatter: &OutputFormatter, stats: &WriteStatistics) {
    formatter.success(&format!(
        "Wrote {} ({})",
        stats.output_path.display(),
        stats.format_file_size()
    ));
    formatter.detail(
        "Write time",
        &format!("{:.2}s", stats.write_time.as_secs_f64()),
    );
}
