//! HTTP proxy server

mod handler;
mod probe;
pub mod server;

pub use handler::{set_stream_flag, upstream_request, ProxyHandler};
pub use probe::stream_has_content;
pub use server::{build_router, run_server, ProxyState};
