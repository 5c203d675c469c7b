//! Utilities for embedding content in switch values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Build a `data:` URI.
///
/// `mime` and `charset` are omitted from the header when `None`. With
/// `base64` the content is base64 encoded, otherwise it is percent-encoded
/// (everything except RFC 3986 unreserved characters).
///
/// ```
/// use wkpdf::utils::data_uri;
///
/// assert_eq!(
///     data_uri(b"body{}", Some("text/css"), Some("utf-8"), true),
///     "data:text/css;charset=utf-8;base64,Ym9keXt9"
/// );
/// assert_eq!(data_uri(b"a b", Some("text/plain"), None, false), "data:text/plain,a%20b");
/// ```
pub fn data_uri(contents: &[u8], mime: Option<&str>, charset: Option<&str>, base64: bool) -> String {
    let mut uri = String::from("data:");

    if let Some(mime) = mime {
        uri.push_str(mime);
    }
    if let Some(charset) = charset {
        uri.push_str(";charset=");
        uri.push_str(charset);
    }

    if base64 {
        uri.push_str(";base64,");
        uri.push_str(&STANDARD.encode(contents));
    } else {
        uri.push(',');
        uri.push_str(&percent_encode(contents));
    }

    uri
}

/// Percent-encode bytes, keeping only RFC 3986 unreserved characters.
fn percent_encode(contents: &[u8]) -> String {
    let mut encoded = String::with_capacity(contents.len());

    for &byte in contents {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    encoded
}
