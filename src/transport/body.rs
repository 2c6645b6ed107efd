//! Response bodies: the one-shot upstream stream and the buffered copy

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use std::io::Cursor;

use crate::error::TransportError;

/// Body as delivered by the upstream collaborator.
///
/// It can be drained exactly once; [`UpstreamBody::collect`] consumes it.
pub struct UpstreamBody {
    stream: BoxStream<'static, Result<Bytes, TransportError>>,
}

impl UpstreamBody {
    pub fn from_stream(stream: BoxStream<'static, Result<Bytes, TransportError>>) -> Self {
        Self { stream }
    }

    /// A body that yields `data` as a single chunk
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            stream: stream::once(async move { Ok::<_, TransportError>(data) }).boxed(),
        }
    }

    /// Drain the whole stream into memory
    pub async fn collect(mut self) -> Result<Bytes, TransportError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl std::fmt::Debug for UpstreamBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamBody").finish_non_exhaustive()
    }
}

/// Owned, finite body that hands out independent readers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayableBody {
    data: Bytes,
}

impl ReplayableBody {
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    /// A fresh reader positioned at the start of the body
    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.data.clone())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
