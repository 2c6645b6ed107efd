//! Traced upstream transport
//!
//! [`TracingTransport`] performs one upstream call through an [`Upstream`]
//! collaborator, dumping the request before the call and the (decoded)
//! response after it, and hands back a response whose body has already been
//! buffered into a [`ReplayableBody`].

mod body;
mod decode;
mod dump;
mod record;
mod traced;
mod upstream;

pub use body::{ReplayableBody, UpstreamBody};
pub use decode::decode_body;
pub use dump::{dump_request_head, dump_response_head, status_text};
pub use record::{
    CollectingSink, Direction, ExchangeCounter, ExchangeRecord, LogToggles, RecordSink, TracingSink,
};
pub use traced::TracingTransport;
pub use upstream::{build_http_client, injected_headers, ReqwestUpstream, Upstream};
