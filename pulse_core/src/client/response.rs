use std::io;

use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::StatusCode;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::body::TrackingBodyStream;
use crate::types::types::Result;

/// Raw `reqwest` body as handed to the tracking decorator.
pub type BodyStream = BoxStream<'static, reqwest::Result<Bytes>>;

/// A response whose body reports progress while it is consumed.
///
/// Status and metadata are copied from the original response; the body is
/// the original byte stream behind a `TrackingBodyStream`.
pub struct TrackedResponse {
    pub(crate) url: String,
    pub(crate) status: StatusCode,
    pub(crate) content_type: Option<String>,
    pub(crate) content_length: Option<u64>,
    pub(crate) body: TrackingBodyStream<BodyStream>,
}

impl TrackedResponse {
    /// Registry key of the request this response answers.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn into_body(self) -> TrackingBodyStream<BodyStream> {
        self.body
    }

    /// Read the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        let capacity = self.content_length.unwrap_or(0).min(8 * 1024 * 1024) as usize;
        let mut buf = BytesMut::with_capacity(capacity);
        let mut body = self.body;
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Expose the body as an `AsyncRead`, e.g. for `tokio::io::copy`.
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.body.map_err(io::Error::other))
    }
}
