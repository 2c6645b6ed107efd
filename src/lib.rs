//! sse-debug-proxy: debugging reverse proxy for streaming HTTP APIs
//!
//! Features:
//! - Colorized dumps of every upstream request and response (JSON, XML,
//!   header blocks), with compressed bodies decoded for display
//! - Transparent fallback to a non-streaming call when the upstream answers
//!   a streaming request with a stream that carries no content
//! - Byte-for-byte relay of the chosen upstream response

pub mod api;
pub mod config;
pub mod error;
pub mod highlight;
pub mod proxy;
pub mod transport;

pub use config::AppConfig;
pub use error::{DecodeError, ProxyError, RewriteError, TransportError};
pub use proxy::{build_router, run_server, ProxyState};
pub use transport::TracingTransport;
