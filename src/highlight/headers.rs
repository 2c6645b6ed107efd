//! Colorized rendering of raw HTTP header blocks

use super::palette::{paint, Category};

/// Which start line a header block begins with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadKind {
    Request,
    Response,
}

/// Highlight a CRLF-delimited header block.
///
/// One trailing CRLF is stripped before processing and is not restored; the
/// caller reattaches the blank terminator line.
pub fn highlight_headers(block: &str, kind: HeadKind) -> String {
    let block = block.strip_suffix("\r\n").unwrap_or(block);
    let mut lines: Vec<String> = block.split("\r\n").map(str::to_string).collect();

    if let Some(first) = lines.first_mut() {
        *first = match kind {
            HeadKind::Request => request_line(first),
            HeadKind::Response => status_line(first),
        };
    }

    for line in lines.iter_mut().skip(1) {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            *line = format!(
                "{}:{}",
                paint(name.trim(), Category::Header),
                paint(value, Category::String)
            );
        }
    }

    lines.join("\r\n")
}

fn request_line(line: &str) -> String {
    let parts: Vec<&str> = line.splitn(3, ' ').collect();
    match parts.as_slice() {
        [method, target, version] => format!(
            "{} {} {}",
            paint(method, Category::Method),
            paint(target, Category::Url),
            version
        ),
        _ => line.to_string(),
    }
}

fn status_line(line: &str) -> String {
    match line.split_once(' ') {
        Some((version, status)) => {
            let code_token = status.split(' ').next().unwrap_or_default();
            let code = code_token.parse::<i64>().unwrap_or(0);
            format!("{} {}", version, paint(status, Category::for_status(code)))
        }
        None => line.to_string(),
    }
}
