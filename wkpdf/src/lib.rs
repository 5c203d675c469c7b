//! wkpdf - Render HTML to PDF with wkhtmltopdf.
//!
//! This library drives the external `wkhtmltopdf` executable. It supports:
//!
//! - A typed option set with normalized switch names
//! - Safe command-line construction (no shell involved)
//! - A subprocess pipeline that streams HTML on stdin and drains stdout and
//!   stderr concurrently, with timeouts and output limits
//! - A fluent document builder with a render cache
//! - Headers, footers, style sheets, data URIs and pooled temp files
//!
//! # Examples
//!
//! ## Render a Document
//!
//! ```no_run
//! use wkpdf::config::Margins;
//! use wkpdf::document::Document;
//! use wkpdf::process::Executable;
//!
//! # async fn example() -> wkpdf::Result<()> {
//! let executable = Executable::resolve("wkhtmltopdf")?;
//! let mut document = Document::from_html(executable, "<h1>Invoice</h1>");
//! document
//!     .page_size("A4")
//!     .margins(&Margins::parse("10 15")?)
//!     .footer()
//!     .right("[page] / [topage]")
//!     .end();
//!
//! let stats = document.save("invoice.pdf").await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the Pipeline Directly
//!
//! ```no_run
//! use wkpdf::command::{RenderRequest, Replacements};
//! use wkpdf::process::{Executable, RenderPipeline, RenderResult};
//! use wkpdf::source::Source;
//! use wkpdf::switches::Switches;
//! use std::time::Duration;
//!
//! # async fn example() -> wkpdf::Result<()> {
//! let mut switches = Switches::new();
//! switches.set("grayscale", true);
//!
//! let request = RenderRequest::from_switches(
//!     Executable::resolve("/usr/local/bin/wkhtmltopdf")?,
//!     &switches,
//!     &Replacements::new(),
//!     Source::html("<p>Hello</p>"),
//! );
//!
//! let pipeline = RenderPipeline::new().with_timeout(Duration::from_secs(60));
//! match pipeline.execute(&request).await? {
//!     RenderResult::Success(pdf) => println!("{} bytes", pdf.len()),
//!     RenderResult::Failure { exit_code, stderr } => eprintln!("{exit_code}: {stderr}"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod io;
pub mod output;
pub mod process;
pub mod source;
pub mod switches;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use document::Document;
pub use error::{Result, WkPdfError};
pub use process::{Executable, RenderPipeline, RenderResult};
pub use source::Source;
pub use switches::{SwitchValue, Switches};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
