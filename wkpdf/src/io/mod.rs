//! Input/output operations.
//!
//! This module handles:
//! - Resolving the HTML source from the command line
//! - Writing rendered PDFs to disk
//! - Pooling temporary files for style sheets and headers/footers

pub mod reader;
pub mod temp;
pub mod writer;

pub use reader::{LoadedSource, SourceReader};
pub use temp::TempFilePool;
pub use writer::{PdfWriter, WriteOptions, WriteStatistics, format_file_size};
