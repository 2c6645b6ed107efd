//! Request handler: streaming call first, non-streaming fallback on an
//! empty stream

use axum::{
    body::{to_bytes, Body},
    http::{header, request, HeaderMap, HeaderName, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use super::probe::stream_has_content;
use super::server::ProxyState;
use crate::config::UpstreamConfig;
use crate::error::{ProxyError, RewriteError, TransportError};
use crate::transport::{decode_body, ReplayableBody};

const MAX_REQUEST_BODY: usize = 100 * 1024 * 1024;

/// Connection-scoped headers, never forwarded in either direction
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection" | "keep-alive" | "proxy-connection" | "te" | "trailer" | "transfer-encoding" | "upgrade"
    )
}

/// Proxy request handler
pub struct ProxyHandler {
    state: ProxyState,
}

impl ProxyHandler {
    pub fn new(state: ProxyState) -> Self {
        Self { state }
    }

    /// Handle an incoming request
    pub async fn handle(&self, req: Request<Body>) -> Response {
        match self.try_handle(req).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    async fn try_handle(&self, req: Request<Body>) -> Result<Response, ProxyError> {
        let (parts, body) = req.into_parts();
        tracing::debug!(method = %parts.method, uri = %parts.uri, "Processing request");

        // Needed for both calls
        let body = to_bytes(body, MAX_REQUEST_BODY)
            .await
            .map_err(|e| ProxyError::ReadBody(e.to_string()))?;

        let streamed = self.call_upstream(&parts, &body, true).await?;

        let chosen = if has_content(&streamed) {
            tracing::debug!("Stream carried content, relaying it");
            streamed
        } else {
            drop(streamed);
            tracing::warn!(
                uri = %parts.uri,
                "Upstream returned a stream without content, retrying with stream=false"
            );
            self.call_upstream(&parts, &body, false).await?
        };

        Ok(relay(chosen))
    }

    async fn call_upstream(
        &self,
        parts: &request::Parts,
        body: &Bytes,
        stream: bool,
    ) -> Result<axum::http::Response<ReplayableBody>, ProxyError> {
        let payload = set_stream_flag(body, stream)?;
        let req = upstream_request(parts, payload, &self.state.config.upstream)?;
        Ok(self.state.transport.execute(req).await?)
    }
}

fn has_content(resp: &axum::http::Response<ReplayableBody>) -> bool {
    let encoding = resp
        .headers()
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok());

    match encoding {
        None => stream_has_content(resp.body().reader()),
        Some(_) => match decode_body(encoding, resp.body().bytes()) {
            Ok(decoded) => stream_has_content(decoded.as_slice()),
            Err(e) => {
                tracing::debug!(error = %e, "Scanning undecodable stream as raw bytes");
                stream_has_content(resp.body().reader())
            }
        },
    }
}

/// Copy of `body` with its top-level `stream` field set
pub fn set_stream_flag(body: &[u8], stream: bool) -> Result<Bytes, RewriteError> {
    let mut value: serde_json::Value = serde_json::from_slice(body)?;
    let object = value.as_object_mut().ok_or(RewriteError::NotAnObject)?;
    object.insert("stream".to_string(), serde_json::Value::Bool(stream));
    Ok(serde_json::to_vec(&value)?.into())
}

/// Mirror the client's request to the upstream with a replacement body
pub fn upstream_request(
    parts: &request::Parts,
    payload: Bytes,
    upstream: &UpstreamConfig,
) -> Result<Request<Bytes>, TransportError> {
    // Query string is kept as-is, never re-encoded
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", upstream.base_url(), path_and_query);

    let mut headers = HeaderMap::with_capacity(parts.headers.len() + 2);
    let host = upstream
        .authority()
        .ok_or_else(|| TransportError::Build(format!("upstream URL has no host: {}", upstream.url)))?;
    headers.insert(
        header::HOST,
        HeaderValue::from_str(&host).map_err(|e| TransportError::Build(e.to_string()))?,
    );
    for (name, value) in &parts.headers {
        if name == header::HOST || name == header::CONTENT_LENGTH || is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(payload.len()));

    let mut req = Request::builder()
        .method(parts.method.clone())
        .uri(url.as_str())
        .body(payload)
        .map_err(|e| TransportError::Build(format!("{}: {}", url, e)))?;
    *req.headers_mut() = headers;
    Ok(req)
}

/// Hand the chosen upstream response to the client unmodified
fn relay(resp: axum::http::Response<ReplayableBody>) -> Response {
    let (parts, body) = resp.into_parts();

    let mut response = Response::new(Body::from(body.into_bytes()));
    *response.status_mut() = parts.status;
    let headers = response.headers_mut();
    for (name, value) in &parts.headers {
        if is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    response
}
