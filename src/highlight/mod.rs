//! Terminal highlighting for dumped HTTP traffic
//!
//! Bodies are colorized by declared content type: anything mentioning
//! `json` goes through the JSON renderer (keys sorted, two-space indent),
//! anything mentioning `xml` through the XML renderer, and everything else
//! is returned untouched. Renderer failures also return the input untouched.

mod headers;
mod json;
mod palette;
mod xml;

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

pub use headers::{highlight_headers, HeadKind};
pub use json::highlight_json;
pub use palette::{paint, Category, RESET};
pub use xml::highlight_xml;

/// Highlight a body according to its content type
pub fn highlight_body<'a>(data: &'a [u8], content_type: &str) -> Cow<'a, [u8]> {
    let ct = content_type.to_lowercase();
    let rendered = if ct.contains("json") {
        highlight_json(data)
    } else if ct.contains("xml") {
        highlight_xml(data)
    } else {
        return Cow::Borrowed(data);
    };

    match rendered {
        Some(text) => Cow::Owned(text.into_bytes()),
        None => Cow::Borrowed(data),
    }
}

/// Remove ANSI color sequences from rendered text
pub fn strip_colors(text: &str) -> Cow<'_, str> {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    let re = ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI pattern"));
    re.replace_all(text, "")
}
