//! Wire-format renderings of request and response heads

use axum::http::{header, HeaderMap, Request, StatusCode, Version};

/// Start line and headers of an outbound request, CRLF-joined, without the
/// terminating blank line
pub fn dump_request_head<B>(req: &Request<B>) -> String {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut lines = vec![format!("{} {} {}", req.method(), target, version_str(req.version()))];

    // Host leads, as on the wire
    if let Some(host) = req.headers().get(header::HOST) {
        lines.push(format!("Host: {}", String::from_utf8_lossy(host.as_bytes())));
    } else if let Some(authority) = req.uri().authority() {
        lines.push(format!("Host: {}", authority));
    }
    push_headers(req.headers(), &mut lines, true);

    lines.join("\r\n")
}

/// Status line and headers of a response, CRLF-joined, without the
/// terminating blank line
pub fn dump_response_head(version: Version, status: StatusCode, headers: &HeaderMap) -> String {
    let mut lines = vec![format!("{} {}", version_str(version), status_text(status))];
    push_headers(headers, &mut lines, false);
    lines.join("\r\n")
}

/// `"200 OK"`-style status text
pub fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn push_headers(headers: &HeaderMap, lines: &mut Vec<String>, skip_host: bool) {
    for (name, value) in headers {
        if skip_host && name == header::HOST {
            continue;
        }
        lines.push(format!(
            "{}: {}",
            name.as_str(),
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}
