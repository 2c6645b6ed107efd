//! Main proxy server implementation

use axum::{extract::State, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handler::ProxyHandler;
use crate::config::AppConfig;
use crate::transport::{ExchangeCounter, RecordSink, ReqwestUpstream, TracingSink, TracingTransport};

/// Shared state for the proxy
#[derive(Clone)]
pub struct ProxyState {
    pub config: Arc<AppConfig>,
    pub transport: TracingTransport,
}

impl ProxyState {
    /// State backed by the real upstream client, logging records through
    /// `tracing`
    pub fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(
        config: AppConfig,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let upstream = ReqwestUpstream::from_config(&config.upstream)?;
        let transport = TracingTransport::new(
            Arc::new(upstream),
            Arc::new(ExchangeCounter::new()),
            sink,
            config.logging.into(),
        );
        Ok(Self {
            config: Arc::new(config),
            transport,
        })
    }
}

/// Every path and method goes through the same handler
pub fn build_router(state: ProxyState) -> Router {
    Router::new()
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the proxy server
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let target = config.upstream.base_url().to_string();

    let state = ProxyState::from_config(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("sse-debug-proxy listening on {}", addr);
    tracing::info!("Proxying to {}", target);

    Ok(axum::serve(listener, app).await?)
}

/// Catch-all proxy handler
async fn proxy_handler(State(state): State<ProxyState>, req: axum::extract::Request) -> axum::response::Response {
    let handler = ProxyHandler::new(state);
    handler.handle(req).await
}
