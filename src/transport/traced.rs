//! Upstream calls with request/response dumps

use axum::http::{header, HeaderMap, Request, Response};
use bytes::Bytes;
use std::sync::Arc;

use super::body::ReplayableBody;
use super::decode::decode_body;
use super::dump::{dump_request_head, dump_response_head, status_text};
use super::record::{Direction, ExchangeCounter, ExchangeRecord, LogToggles, RecordSink};
use super::upstream::Upstream;
use crate::error::TransportError;
use crate::highlight::{highlight_body, highlight_headers, HeadKind};

/// Wraps an [`Upstream`] and emits one correlated pair of exchange records
/// per call.
///
/// The returned response carries a [`ReplayableBody`]: the upstream stream is
/// drained here and never handed on.
#[derive(Clone)]
pub struct TracingTransport {
    upstream: Arc<dyn Upstream>,
    counter: Arc<ExchangeCounter>,
    sink: Arc<dyn RecordSink>,
    toggles: LogToggles,
}

impl TracingTransport {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        counter: Arc<ExchangeCounter>,
        sink: Arc<dyn RecordSink>,
        toggles: LogToggles,
    ) -> Self {
        Self {
            upstream,
            counter,
            sink,
            toggles,
        }
    }

    pub fn counter(&self) -> &Arc<ExchangeCounter> {
        &self.counter
    }

    pub async fn execute(&self, mut req: Request<Bytes>) -> Result<Response<ReplayableBody>, TransportError> {
        let ordinal = self.counter.next();
        self.upstream.prepare(&mut req);

        if self.toggles.requests {
            self.sink.emit(&request_record(ordinal, &req));
        }

        let resp = match self.upstream.send(req).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(ordinal, error = %e, "Upstream call failed");
                return Err(e);
            }
        };

        let (parts, body) = resp.into_parts();
        let raw = body.collect().await?;

        if self.toggles.responses {
            let head = dump_response_head(parts.version, parts.status, &parts.headers);
            let decoded = match decode_body(header_str(&parts.headers, header::CONTENT_ENCODING), &raw) {
                Ok(decoded) => decoded,
                Err(e) => {
                    tracing::debug!(ordinal, error = %e, "Body decode failed, dumping raw bytes");
                    raw.to_vec()
                }
            };
            let content_type = header_str(&parts.headers, header::CONTENT_TYPE).unwrap_or_default();

            self.sink.emit(&ExchangeRecord {
                ordinal,
                direction: Direction::Response {
                    status: status_text(parts.status),
                },
                head: highlight_headers(&head, HeadKind::Response),
                body: render_body(&decoded, content_type),
            });
        }

        Ok(Response::from_parts(parts, ReplayableBody::new(raw)))
    }
}

fn request_record(ordinal: u64, req: &Request<Bytes>) -> ExchangeRecord {
    let head = dump_request_head(req);
    let content_type = header_str(req.headers(), header::CONTENT_TYPE).unwrap_or_default();

    ExchangeRecord {
        ordinal,
        direction: Direction::Request,
        head: highlight_headers(&head, HeadKind::Request),
        body: render_body(req.body(), content_type),
    }
}

fn render_body(data: &[u8], content_type: &str) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    let highlighted = highlight_body(data, content_type);
    Some(String::from_utf8_lossy(&highlighted).into_owned())
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
