//! The outbound HTTP collaborator

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue, Request, Response};
use bytes::Bytes;
use futures::StreamExt;
use std::time::Duration;

use super::body::UpstreamBody;
use crate::config::UpstreamConfig;
use crate::error::TransportError;

/// Performs one network round trip
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Add any headers the transport would inject on its own, so `req` is
    /// complete before it is dumped
    fn prepare(&self, _req: &mut Request<Bytes>) {}

    /// Send `req` exactly as given; the returned body is still unread
    async fn send(&self, req: Request<Bytes>) -> Result<Response<UpstreamBody>, TransportError>;
}

/// [`Upstream`] backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
    injected: HeaderMap,
}

impl ReqwestUpstream {
    /// `client` must have been built by [`build_http_client`] or carry only
    /// reqwest's stock default headers
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            injected: injected_headers(),
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Upstream for ReqwestUpstream {
    fn prepare(&self, req: &mut Request<Bytes>) {
        // reqwest fills the same headers only when absent
        for (name, value) in &self.injected {
            if !req.headers().contains_key(name) {
                req.headers_mut().insert(name.clone(), value.clone());
            }
        }
    }

    async fn send(&self, req: Request<Bytes>) -> Result<Response<UpstreamBody>, TransportError> {
        let req = reqwest::Request::try_from(req).map_err(|e| TransportError::Build(e.to_string()))?;
        let resp = self.client.execute(req).await?;

        let status = resp.status();
        let version = resp.version();
        let headers = resp.headers().clone();
        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Body(e.to_string())))
            .boxed();

        let mut out = Response::new(UpstreamBody::from_stream(stream));
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

/// Headers the client adds to every request that does not set them
pub fn injected_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers
}

/// Build an HTTP client with TLS configuration.
///
/// Redirects are not followed and bodies are not decompressed, so callers
/// see exactly what the upstream sent.
pub fn build_http_client(config: &UpstreamConfig) -> Result<reqwest::Client, Box<dyn std::error::Error>> {
    let mut client_builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .redirect(reqwest::redirect::Policy::none())
        .default_headers(injected_headers())
        .pool_max_idle_per_host(10);

    if let Some(ref tls) = config.tls {
        if tls.accept_invalid_certs {
            client_builder = client_builder.danger_accept_invalid_certs(true);
            tracing::warn!("TLS: Accepting invalid certificates (use only for development/testing)");
        }

        if let Some(ref ca_path) = tls.ca_cert_path {
            let ca_cert = std::fs::read(ca_path)?;
            let ca_cert = reqwest::Certificate::from_pem(&ca_cert)?;
            client_builder = client_builder.add_root_certificate(ca_cert);
            tracing::info!("TLS: Loaded custom CA certificate from {}", ca_path);
        }

        // mTLS needs both halves
        if let (Some(cert_path), Some(key_path)) = (&tls.client_cert_path, &tls.client_key_path) {
            let cert_pem = std::fs::read(cert_path)?;
            let key_pem = std::fs::read(key_path)?;

            let identity = reqwest::Identity::from_pem(&[cert_pem, key_pem].concat())?;
            client_builder = client_builder.identity(identity);
            tracing::info!("TLS: Loaded client certificate from {} for mTLS", cert_path);
        }
    }

    Ok(client_builder.build()?)
}
