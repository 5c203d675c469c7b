//! The document builder.
//!
//! A [`Document`] owns an option set, the header/footer replacements and a
//! source, and turns them into a [`RenderRequest`] when rendered. The
//! rendered PDF is cached until any of those inputs changes.
//!
//! ```no_run
//! use wkpdf::config::Orientation;
//! use wkpdf::document::Document;
//! use wkpdf::process::Executable;
//!
//! # async fn example() -> wkpdf::Result<()> {
//! let mut document = Document::from_html(Executable::resolve("wkhtmltopdf")?, "<h1>Report</h1>");
//! document
//!     .page_size("Letter")
//!     .orientation(Orientation::Landscape)
//!     .header()
//!     .center("[title]")
//!     .line(true)
//!     .end()
//!     .replace("title", Some("Quarterly"));
//!
//! let pdf = document.render().await?;
//! assert!(pdf.starts_with(b"%PDF"));
//! # Ok(())
//! # }
//! ```

mod header_footer;

pub use header_footer::HeaderFooter;

use std::path::Path;
use std::sync::Arc;

use crate::command::{RenderRequest, Replacements};
use crate::config::{Margins, Orientation};
use crate::error::{Result, WkPdfError};
use crate::io::{PdfWriter, TempFilePool, WriteStatistics};
use crate::process::{Executable, RenderPipeline};
use crate::source::Source;
use crate::switches::{SwitchValue, Switches};
use crate::utils::data_uri;

/// Resolution used when none (or zero) is given.
pub const DEFAULT_DPI: u32 = 300;

/// Switches every new document starts with.
pub fn default_switches() -> Switches {
    let mut switches = Switches::new();
    switches.set("encoding", "utf-8");
    switches.set("dpi", DEFAULT_DPI);
    switches.set("disable-javascript", true);
    switches.set("no-outline", true);
    for side in ["top", "bottom", "left", "right"] {
        switches.set(&format!("margin-{side}"), "18mm");
    }
    switches
}

/// An HTML document to be rendered to PDF.
#[derive(Debug)]
pub struct Document {
    executable: Executable,
    pipeline: RenderPipeline,
    switches: Switches,
    replacements: Replacements,
    source: Option<Source>,
    temp_files: Option<Arc<TempFilePool>>,
    result: Option<Vec<u8>>,
}

impl Document {
    /// Create a document without a source, using the default switches.
    pub fn new(executable: Executable) -> Self {
        Self {
            executable,
            pipeline: RenderPipeline::default(),
            switches: default_switches(),
            replacements: Replacements::new(),
            source: None,
            temp_files: None,
            result: None,
        }
    }

    /// Create a document from inline HTML.
    pub fn from_html(executable: Executable, html: impl Into<Vec<u8>>) -> Self {
        let mut document = Self::new(executable);
        document.source = Some(Source::html(html));
        document
    }

    /// Create a document from an HTML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    pub fn from_file(executable: Executable, path: impl AsRef<Path>) -> Result<Self> {
        let mut document = Self::new(executable);
        document.source = Some(Source::file(path)?);
        Ok(document)
    }

    /// Create a document from markup or a file path, see [`Source::detect`].
    pub fn from_source(executable: Executable, input: &str) -> Result<Self> {
        let mut document = Self::new(executable);
        document.source = Some(Source::detect(input)?);
        Ok(document)
    }

    /// Use a specific pipeline (timeout, output limits).
    pub fn with_pipeline(mut self, pipeline: RenderPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Share a temp file pool with other documents.
    pub fn with_temp_files(mut self, pool: Arc<TempFilePool>) -> Self {
        self.temp_files = Some(pool);
        self
    }

    /// The wkhtmltopdf executable.
    pub fn executable(&self) -> &Executable {
        &self.executable
    }

    /// The configured option set.
    pub fn switches(&self) -> &Switches {
        &self.switches
    }

    /// Header/footer replacements.
    pub fn replacements(&self) -> &Replacements {
        &self.replacements
    }

    /// Current source, if any.
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    /// Replace the source.
    pub fn set_source(&mut self, source: Source) -> &mut Self {
        self.source = Some(source);
        self.clear_result()
    }

    /// Replace the source with inline HTML.
    pub fn set_html(&mut self, html: impl Into<Vec<u8>>) -> &mut Self {
        self.set_source(Source::html(html))
    }

    /// Replace the source with an HTML file.
    pub fn set_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let source = Source::file(path)?;
        Ok(self.set_source(source))
    }

    /// Set a switch. The name is normalized (`pageSize` → `page-size`).
    pub fn set(&mut self, name: &str, value: impl Into<SwitchValue>) -> &mut Self {
        if self.switches.set(name, value).is_none() {
            tracing::warn!(name, "ignoring switch with no usable name");
        }
        self.clear_result()
    }

    /// Get the value of a switch.
    pub fn get(&self, name: &str) -> Option<&SwitchValue> {
        self.switches.get(name)
    }

    /// Remove a switch, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<SwitchValue> {
        let previous = self.switches.remove(name);
        self.clear_result();
        previous
    }

    /// Check whether a switch is set.
    pub fn contains(&self, name: &str) -> bool {
        self.switches.contains(name)
    }

    /// Set margins. Sides left as `None` are not touched.
    pub fn margins(&mut self, margins: &Margins) -> &mut Self {
        for (side, value) in margins.sides() {
            self.set(&format!("margin-{side}"), value);
        }
        self
    }

    /// Include or exclude the document outline.
    pub fn outline(&mut self, include: bool) -> &mut Self {
        self.toggle("outline", "no-outline", include)
    }

    /// Print or skip background colors and images.
    pub fn background(&mut self, include: bool) -> &mut Self {
        self.toggle("background", "no-background", include)
    }

    /// Load or skip images.
    pub fn images(&mut self, include: bool) -> &mut Self {
        self.toggle("images", "no-images", include)
    }

    /// Enable or disable WebKit's smart shrinking.
    pub fn smart_shrinking(&mut self, enable: bool) -> &mut Self {
        self.toggle("enable-smart-shrinking", "disable-smart-shrinking", enable)
    }

    /// Keep or drop links to external URIs.
    pub fn external_links(&mut self, enable: bool) -> &mut Self {
        self.toggle("enable-external-links", "disable-external-links", enable)
    }

    fn toggle(&mut self, on: &str, off: &str, enable: bool) -> &mut Self {
        self.set(off, !enable);
        self.set(on, enable)
    }

    /// Set the page orientation.
    pub fn orientation(&mut self, orientation: Orientation) -> &mut Self {
        self.set("orientation", orientation.as_str())
    }

    /// Set the paper size (A4, Letter, ...).
    pub fn page_size(&mut self, page_size: &str) -> &mut Self {
        self.set("page-size", page_size)
    }

    /// Set the resolution. Zero means the default of 300.
    pub fn dpi(&mut self, dpi: u32) -> &mut Self {
        let dpi = if dpi == 0 { DEFAULT_DPI } else { dpi };
        self.set("dpi", dpi)
    }

    /// Set or clear the PDF title.
    pub fn title(&mut self, title: Option<&str>) -> &mut Self {
        self.set("title", title)
    }

    /// Apply extra CSS given as a string.
    ///
    /// The style sheet is passed as a data URI, or through a temp file with
    /// `use_temp_file`.
    pub fn css_string(
        &mut self,
        css: &str,
        charset: Option<&str>,
        use_temp_file: bool,
    ) -> Result<&mut Self> {
        let value = if use_temp_file {
            self.temp_file(css.as_bytes(), "css")?
        } else {
            data_uri(css.as_bytes(), Some("text/css"), charset, true)
        };
        Ok(self.set("user-style-sheet", value))
    }

    /// Apply extra CSS from a file.
    pub fn css_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = readable_file(path.as_ref())?;
        Ok(self.set("user-style-sheet", path))
    }

    /// Set a `[name]` replacement for header and footer text. `None` removes it.
    pub fn replace(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => {
                self.replacements.insert(name.to_string(), value.to_string());
            }
            None => {
                self.replacements.remove(name);
            }
        }
        self.clear_result()
    }

    /// Configure the page header.
    pub fn header(&mut self) -> HeaderFooter<'_> {
        HeaderFooter::new(self, &["header"])
    }

    /// Configure the page footer.
    pub fn footer(&mut self) -> HeaderFooter<'_> {
        HeaderFooter::new(self, &["footer"])
    }

    /// Configure header and footer together.
    pub fn header_and_footer(&mut self) -> HeaderFooter<'_> {
        HeaderFooter::new(self, &["header", "footer"])
    }

    /// Build the request the next render would run.
    ///
    /// # Errors
    ///
    /// Returns `MissingSource` if no source has been set.
    pub fn request(&self) -> Result<RenderRequest> {
        let source = self.source.clone().ok_or(WkPdfError::MissingSource)?;
        Ok(RenderRequest::from_switches(
            self.executable.clone(),
            &self.switches,
            &self.replacements,
            source,
        ))
    }

    /// Whether a rendered PDF is cached.
    pub fn is_rendered(&self) -> bool {
        self.result.is_some()
    }

    /// Render the document, reusing the cached PDF if nothing changed.
    ///
    /// # Errors
    ///
    /// Returns `RenderFailed` with wkhtmltopdf's stderr if it exits with a
    /// non-zero status, or any pipeline error.
    pub async fn render(&mut self) -> Result<&[u8]> {
        if self.result.is_none() {
            let request = self.request()?;
            let pdf = self.pipeline.execute(&request).await?.into_pdf()?;
            tracing::debug!(bytes = pdf.len(), "rendered document");
            self.result = Some(pdf);
        } else {
            tracing::trace!("using cached render");
        }

        Ok(self.result.as_deref().unwrap_or_default())
    }

    /// Render (if needed) and write the PDF to `path`.
    pub async fn save(&mut self, path: impl AsRef<Path>) -> Result<WriteStatistics> {
        let pdf = self.render().await?;
        PdfWriter::new().save_with_stats(pdf, path.as_ref()).await
    }

    fn clear_result(&mut self) -> &mut Self {
        if self.result.take().is_some() {
            tracing::trace!("cleared cached render");
        }
        self
    }

    fn temp_file(&mut self, contents: &[u8], extension: &str) -> Result<String> {
        let pool = match &self.temp_files {
            Some(pool) => Arc::clone(pool),
            None => {
                let pool = Arc::new(TempFilePool::new()?);
                self.temp_files = Some(Arc::clone(&pool));
                pool
            }
        };
        let path = pool.create(contents, extension)?;
        Ok(path.to_string_lossy().into_owned())
    }
}

/// Canonical path of a readable file, as a switch value.
fn readable_file(path: &Path) -> Result<String> {
    let source = Source::file(path)?;
    let path = source
        .path()
        .ok_or_else(|| WkPdfError::source_not_found(path))?;
    Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::switches::SwitchValue::{Flag, Value};
    use rstest::rstest;
    use tempfile::TempDir;

    fn executable() -> Executable {
        Executable::resolve("sh").unwrap()
    }

    fn document() -> Document {
        Document::from_html(executable(), "<p>test</p>")
    }

    fn value(document: &Document, name: &str) -> Option<SwitchValue> {
        document.get(name).cloned()
    }

    #[test]
    fn test_default_switches() {
        let document = Document::new(executable());

        assert_eq!(value(&document, "encoding"), Some(Value("utf-8".into())));
        assert_eq!(value(&document, "dpi"), Some(Value("300".into())));
        assert_eq!(value(&document, "disable-javascript"), Some(Flag(true)));
        assert_eq!(value(&document, "no-outline"), Some(Flag(true)));
        assert_eq!(value(&document, "marginTop"), Some(Value("18mm".into())));
        assert_eq!(document.switches().len(), 8);
        assert!(document.source().is_none());
    }

    #[test]
    fn test_set_normalizes_names() {
        let mut document = document();
        document.set("pageSize", "A4").set("page-size", "Letter");

        assert_eq!(value(&document, "PageSize"), Some(Value("Letter".into())));
        assert!(document.contains("page_Size"));
    }

    #[test]
    fn test_underscore_is_not_a_separator() {
        let mut document = document();
        document.set("page-size", "A4").set("page_size", "Letter");

        assert_eq!(value(&document, "page-size"), Some(Value("A4".into())));
        assert_eq!(value(&document, "pagesize"), Some(Value("Letter".into())));
        assert_eq!(document.switches().len(), 10);
    }

    #[test]
    fn test_remove() {
        let mut document = document();
        assert_eq!(document.remove("dpi"), Some(Value("300".into())));
        assert!(!document.contains("dpi"));
        assert_eq!(document.remove("dpi"), None);
    }

    #[rstest(
        on,
        off,
        case("outline", "no-outline"),
        case("background", "no-background"),
        case("images", "no-images"),
        case("enable-smart-shrinking", "disable-smart-shrinking"),
        case("enable-external-links", "disable-external-links")
    )]
    fn test_toggles_write_both_switches(on: &str, off: &str) {
        let mut document = document();
        match on {
            "outline" => document.outline(true),
            "background" => document.background(true),
            "images" => document.images(true),
            "enable-smart-shrinking" => document.smart_shrinking(true),
            _ => document.external_links(true),
        };
        assert_eq!(value(&document, on), Some(Flag(true)));
        assert_eq!(value(&document, off), Some(Flag(false)));
    }

    #[test]
    fn test_outline_off() {
        let mut document = document();
        document.outline(false);
        assert_eq!(value(&document, "outline"), Some(Flag(false)));
        assert_eq!(value(&document, "no-outline"), Some(Flag(true)));
    }

    #[test]
    fn test_margins_leave_unset_sides() {
        let mut document = document();
        document.margins(&Margins {
            top: Some("1in".to_string()),
            ..Default::default()
        });

        assert_eq!(value(&document, "margin-top"), Some(Value("1in".into())));
        assert_eq!(value(&document, "margin-left"), Some(Value("18mm".into())));
    }

    #[test]
    fn test_orientation_page_size_title() {
        let mut document = document();
        document
            .orientation(Orientation::Landscape)
            .page_size("Letter")
            .title(Some("Report"));

        assert_eq!(value(&document, "orientation"), Some(Value("Landscape".into())));
        assert_eq!(value(&document, "page-size"), Some(Value("Letter".into())));
        assert_eq!(value(&document, "title"), Some(Value("Report".into())));

        document.title(None);
        assert_eq!(value(&document, "title"), Some(SwitchValue::Absent));
    }

    #[rstest(input, expected, case(0, "300"), case(96, "96"), case(600, "600"))]
    fn test_dpi(input: u32, expected: &str) {
        let mut document = document();
        document.dpi(input);
        assert_eq!(value(&document, "dpi"), Some(Value(expected.into())));
    }

    #[test]
    fn test_css_string_as_data_uri() {
        let mut document = document();
        document.css_string("body{}", Some("utf-8"), false).unwrap();

        assert_eq!(
            value(&document, "user-style-sheet"),
            Some(Value("data:text/css;charset=utf-8;base64,Ym9keXt9".into()))
        );
    }

    #[test]
    fn test_css_string_as_temp_file() {
        let mut document = document();
        document.css_string("body{}", None, true).unwrap();

        let path = match value(&document, "user-style-sheet") {
            Some(Value(path)) => path,
            other => panic!("unexpected value {other:?}"),
        };
        assert!(path.ends_with(".css"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "body{}");
    }

    #[test]
    fn test_css_file() {
        let temp_dir = TempDir::new().unwrap();
        let css = temp_dir.path().join("style.css");
        std::fs::write(&css, "p{}").unwrap();

        let mut document = document();
        document.css_file(&css).unwrap();
        let expected = css.canonicalize().unwrap().to_string_lossy().into_owned();
        assert_eq!(value(&document, "user-style-sheet"), Some(Value(expected)));

        assert!(document.css_file(temp_dir.path().join("missing.css")).is_err());
    }

    #[test]
    fn test_replace() {
        let mut document = document();
        document.replace("title", Some("Report")).replace("empty", Some(""));
        assert_eq!(document.replacements().len(), 2);

        document.replace("title", None);
        assert_eq!(document.replacements().get("empty"), Some(&String::new()));
        assert!(!document.replacements().contains_key("title"));
    }

    #[test]
    fn test_request_requires_source() {
        let document = Document::new(executable());
        assert!(matches!(
            document.request().unwrap_err(),
            WkPdfError::MissingSource
        ));
    }

    #[test]
    fn test_request_ends_with_io_tokens() {
        let request = document().request().unwrap();
        let argv = request.argv();
        let tail: Vec<_> = argv[argv.len() - 2..]
            .iter()
            .map(|token| token.to_string_lossy().into_owned())
            .collect();
        assert_eq!(tail, vec!["-", "-"]);
        assert_eq!(request.payload(), Some(&b"<p>test</p>"[..]));
    }

    #[test]
    fn test_from_source_detects_kind() {
        let temp_dir = TempDir::new().unwrap();
        let page = temp_dir.path().join("page.html");
        std::fs::write(&page, "<p>file</p>").unwrap();

        let from_file = Document::from_source(executable(), page.to_str().unwrap()).unwrap();
        assert!(from_file.source().unwrap().path().is_some());

        let inline = Document::from_source(executable(), "<p>x</p>").unwrap();
        assert!(inline.source().unwrap().payload().is_some());

        assert!(Document::from_source(executable(), "missing.html").is_err());
    }
}
