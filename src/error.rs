//! Error types shared by the transport and the proxy handler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Failure talking to the upstream service
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build upstream request: {0}")]
    Build(String),

    #[error("upstream request failed: {0}")]
    Send(#[from] reqwest::Error),

    #[error("failed to read upstream response body: {0}")]
    Body(String),
}

/// Invalid framing for a declared content encoding
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("gzip decompression failed: {0}")]
    Gzip(std::io::Error),

    #[error("deflate decompression failed: {0}")]
    Deflate(std::io::Error),

    #[error("brotli decompression failed: {0}")]
    Brotli(std::io::Error),

    #[error("zstd decompression failed: {0}")]
    Zstd(std::io::Error),
}

/// The request body cannot carry a stream flag
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("request body is not a JSON object")]
    NotAnObject,
}

/// Errors that abort the client-facing call
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("failed to read request body: {0}")]
    ReadBody(String),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::ReadBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::Rewrite(_) | ProxyError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(status = %status, error = %self, "Request failed");
        (status, format!("{}\n", self)).into_response()
    }
}
