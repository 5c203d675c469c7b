use std::path::Path;

use super::{Document, readable_file};
use crate::error::Result;
use crate::switches::SwitchValue;
use crate::utils::data_uri;

/// Appended to data-URI header/footer HTML. wkhtmltopdf adds a query string
/// with the page variables to the URL; this swallows it into a comment.
const QUERY_SWALLOW: &str = "<!--<![CDATA[";

/// Builder for page header and/or footer switches.
///
/// Every call writes `<target>-<setting>` for each target, so a builder
/// returned by [`Document::header_and_footer`] sets both at once. Call
/// [`end`](Self::end) to get back to the document.
#[derive(Debug)]
pub struct HeaderFooter<'a> {
    document: &'a mut Document,
    targets: &'static [&'static str],
}

impl<'a> HeaderFooter<'a> {
    pub(super) fn new(document: &'a mut Document, targets: &'static [&'static str]) -> Self {
        Self { document, targets }
    }

    fn set(self, setting: &str, value: impl Into<SwitchValue>) -> Self {
        let value = value.into();
        for target in self.targets {
            self.document.set(&format!("{target}-{setting}"), value.clone());
        }
        self
    }

    /// Left-aligned text. Page variables like `[page]` are substituted.
    pub fn left(self, text: impl Into<SwitchValue>) -> Self {
        self.set("left", text)
    }

    /// Centered text.
    pub fn center(self, text: impl Into<SwitchValue>) -> Self {
        self.set("center", text)
    }

    /// Right-aligned text.
    pub fn right(self, text: impl Into<SwitchValue>) -> Self {
        self.set("right", text)
    }

    /// Set all three text slots. `None` clears a slot.
    pub fn text(self, left: Option<&str>, center: Option<&str>, right: Option<&str>) -> Self {
        self.left(left).center(center).right(right)
    }

    /// Draw a separator line.
    pub fn line(self, include: bool) -> Self {
        self.set("line", include)
    }

    /// Distance from the content in millimetres.
    pub fn spacing(self, millimetres: f64) -> Self {
        self.set("spacing", millimetres)
    }

    /// Font name and size; `None` leaves a setting unchanged.
    pub fn font(self, name: Option<&str>, size: Option<u32>) -> Self {
        let builder = match name {
            Some(name) => self.set("font-name", name),
            None => self,
        };
        match size {
            Some(size) => builder.set("font-size", size),
            None => builder,
        }
    }

    /// Use an HTML string as the header/footer.
    ///
    /// With `use_data_uri` the HTML is inlined as a data URI, otherwise it is
    /// written to the document's temp file pool.
    pub fn html_string(self, html: &str, use_data_uri: bool, charset: Option<&str>) -> Result<Self> {
        let value = if use_data_uri {
            let html = format!("{html}{QUERY_SWALLOW}");
            data_uri(html.as_bytes(), Some("text/html"), charset, true)
        } else {
            self.document.temp_file(html.as_bytes(), "html")?
        };
        Ok(self.set("html", value))
    }

    /// Use an HTML file as the header/footer.
    pub fn html_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = readable_file(path.as_ref())?;
        Ok(self.set("html", path))
    }

    /// Return to the document.
    pub fn end(self) -> &'a mut Document {
        self.document
    }
}
