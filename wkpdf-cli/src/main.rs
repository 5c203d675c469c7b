//! wkpdf - Render HTML to PDF with wkhtmltopdf.
//!
//! A command-line front end for the wkpdf library.

mod cli;

use clap::Parser;
use std::process;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::Cli;
use wkpdf::config::{Config, OverwriteMode};
use wkpdf::document::Document;
use wkpdf::error::WkPdfError;
use wkpdf::io::{LoadedSource, SourceReader};
use wkpdf::output::{
    OutputFormatter, display_command, display_validation_summary, display_write_statistics,
};
use wkpdf::source::{STDIO_TOKEN, Source};
use wkpdf::validation::Validator;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Run the application and handle errors
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the diagnostics subscriber. `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), WkPdfError> {
    // Validate CLI arguments
    cli.validate()?;

    // Convert CLI to config
    let config = cli.to_config()?;

    // Create output formatter
    let formatter = OutputFormatter::from_config(&config);

    // Print header
    if formatter.should_print() && !config.json {
        formatter.section(&format!("{} v{}", wkpdf::NAME, wkpdf::VERSION));
    }

    // Validate configuration and input
    let validator = Validator::new();
    let validation_summary = validator.validate_config(&config).await?;
    tracing::debug!(executable = %validation_summary.executable.display(), "validated configuration");

    if formatter.is_verbose() && !config.json {
        display_validation_summary(&formatter, &validation_summary);
    }

    let loaded = load_source(&config).await?;

    let mut document = Document::new(validator.validate_executable(&config)?)
        .with_pipeline(config.pipeline());
    document.set_source(loaded.source);
    config.apply_to(&mut document)?;

    // Dry run mode - stop here
    if config.dry_run {
        let mut preview = document.request()?.preview();
        if config.input == STDIO_TOKEN {
            // stdin was not read, so its size is unknown
            preview.stdin_bytes = None;
        }

        if config.json {
            let report = serde_json::json!({
                "validation": validation_summary,
                "command": preview,
            });
            formatter.raw(&json_string(&report)?);
        } else {
            display_command(&formatter, &preview);
            formatter.success("Dry run completed successfully");
        }
        return Ok(());
    }

    // Handle output file existence
    if !config.writes_to_stdout() {
        handle_output_overwrite(&config, &formatter).await?;
    }

    formatter.info("Rendering...");

    if config.writes_to_stdout() {
        let pdf = document.render().await?;
        let mut stdout = tokio::io::stdout();
        stdout.write_all(pdf).await?;
        stdout.flush().await?;
        tracing::debug!(bytes = pdf.len(), "wrote PDF to stdout");
        return Ok(());
    }

    let write_stats = document.save(&config.output).await?;

    if config.json {
        let report = serde_json::json!({
            "validation": validation_summary,
            "output": write_stats.output_path,
            "fileSize": write_stats.file_size,
            "writeTimeMs": write_stats.write_time.as_millis() as u64,
            "loadTimeMs": loaded.load_time.as_millis() as u64,
        });
        formatter.raw(&json_string(&report)?);
    } else if formatter.should_print() {
        display_write_statistics(&formatter, &write_stats);

        if formatter.is_verbose() {
            formatter.section("Statistics");
            formatter.detail("Input size", &wkpdf::io::format_file_size(loaded.size));
            formatter.detail("Output size", &write_stats.format_file_size());
            formatter.detail(
                "Load time",
                &format!("{:.2}s", loaded.load_time.as_secs_f64()),
            );
        }
    }

    Ok(())
}

/// Resolve the input argument into a source.
///
/// A dry run never reads stdin; the command it prints is the same either way.
async fn load_source(config: &Config) -> Result<LoadedSource, WkPdfError> {
    if config.dry_run && config.input == STDIO_TOKEN {
        return Ok(LoadedSource {
            source: Source::html(Vec::new()),
            size: 0,
            load_time: Default::default(),
        });
    }

    SourceReader::new().load(&config.input).await
}

fn json_string(value: &serde_json::Value) -> Result<String, WkPdfError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| WkPdfError::other(format!("Failed to encode report: {err}")))
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), WkPdfError> {
    // Check if output exists
    if !tokio::fs::try_exists(&config.output).await.unwrap_or(false) {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(WkPdfError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Without a terminal to ask on, treat as no-clobber
            if formatter.is_quiet() || config.json || config.input == STDIO_TOKEN {
                return Err(WkPdfError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            // Simple yes/no prompt
            use std::io::{self, Write};
            eprint!("Overwrite? [y/N]: ");
            io::stderr().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| WkPdfError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(WkPdfError::Cancelled)
            }
        }
    }
}
