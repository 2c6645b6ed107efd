//! Colorized XML rendering over a quick-xml token stream

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::palette::{paint, Category};

/// Render an XML payload, or `None` on any decode failure.
///
/// Nothing is returned for a document that fails part way through.
pub fn highlight_xml(data: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(data).ok()?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().expand_empty_elements = true;

    let mut out = String::with_capacity(data.len() * 2);
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                push_indent(depth, &mut out);
                render_start(&start, &mut out)?;
                out.push('\n');
                depth += 1;
            }
            Ok(Event::End(end)) => {
                depth = depth.checked_sub(1)?;
                let name = std::str::from_utf8(end.local_name().into_inner()).ok()?;
                push_indent(depth, &mut out);
                out.push_str(&paint(&format!("</{}>", name), Category::Tag));
                out.push('\n');
            }
            Ok(Event::Text(text)) => {
                let unescaped = text.unescape().ok()?;
                push_char_data(&unescaped, depth, &mut out);
            }
            Ok(Event::CData(cdata)) => {
                let raw = std::str::from_utf8(&cdata).ok()?;
                push_char_data(raw, depth, &mut out);
            }
            Ok(Event::Comment(comment)) => {
                let body = std::str::from_utf8(&comment).ok()?;
                push_indent(depth, &mut out);
                out.push_str(&paint(&format!("<!--{}-->", body), Category::Null));
                out.push('\n');
            }
            Ok(Event::Eof) => break,
            // declarations, processing instructions, doctypes
            Ok(_) => {}
            Err(e) => {
                tracing::trace!(error = %e, "XML decode failed, leaving body unhighlighted");
                return None;
            }
        }
    }

    if depth != 0 {
        return None;
    }
    Some(out)
}

fn render_start(start: &BytesStart<'_>, out: &mut String) -> Option<()> {
    let name = std::str::from_utf8(start.local_name().into_inner()).ok()?;
    out.push_str(&paint(&format!("<{}", name), Category::Tag));

    for attr in start.attributes() {
        let attr = attr.ok()?;
        let key = std::str::from_utf8(attr.key.local_name().into_inner()).ok()?;
        let value = attr.unescape_value().ok()?;
        out.push(' ');
        out.push_str(&paint(key, Category::Attr));
        out.push_str(&paint("=", Category::Punct));
        out.push_str(&paint(&format!("\"{}\"", value), Category::String));
    }

    out.push_str(&paint(">", Category::Tag));
    Some(())
}

fn push_char_data(text: &str, depth: usize, out: &mut String) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    push_indent(depth, out);
    out.push_str(&paint(trimmed, Category::String));
    out.push('\n');
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::strip_colors;

    #[test]
    fn test_simple_element() {
        let out = highlight_xml(b"<p>Hello</p>").unwrap();
        assert!(out.contains(Category::Tag.code()));
        assert_eq!(strip_colors(&out), "<p>\n  Hello\n</p>\n");
    }

    #[test]
    fn test_nested_with_attributes() {
        let out = highlight_xml(br#"<root a="1" b="x&amp;y"><child/></root>"#).unwrap();
        assert!(out.contains(&paint("a", Category::Attr)));
        assert!(out.contains(&paint("\"x&y\"", Category::String)));
        assert_eq!(
            strip_colors(&out),
            "<root a=\"1\" b=\"x&y\">\n  <child>\n  </child>\n</root>\n"
        );
    }

    #[test]
    fn test_whitespace_text_suppressed() {
        let out = highlight_xml(b"<a>\n   <b>  hi  </b>\n</a>").unwrap();
        assert_eq!(strip_colors(&out), "<a>\n  <b>\n    hi\n  </b>\n</a>\n");
    }

    #[test]
    fn test_comment_rendered() {
        let out = highlight_xml(b"<a><!-- note --></a>").unwrap();
        assert!(out.contains(&paint("<!-- note -->", Category::Null)));
    }

    #[test]
    fn test_declaration_skipped() {
        let out = highlight_xml(b"<?xml version=\"1.0\"?><a>1</a>").unwrap();
        assert_eq!(strip_colors(&out), "<a>\n  1\n</a>\n");
    }

    #[test]
    fn test_namespace_prefix_dropped() {
        let out = highlight_xml(br#"<s:env xmlns:s="urn:x"><s:body/></s:env>"#).unwrap();
        let plain = strip_colors(&out);
        assert!(plain.starts_with("<env "));
        assert!(plain.contains("  <body>\n  </body>\n"));
        assert!(plain.ends_with("</env>\n"));
    }

    #[test]
    fn test_mismatched_tags_fail() {
        assert!(highlight_xml(b"<a><b></a></b>").is_none());
    }

    #[test]
    fn test_unclosed_document_fails() {
        assert!(highlight_xml(b"<a><b>text</b>").is_none());
    }
}
