use std::io::{self, Read};
use std::sync::Arc;

use super::state::StreamState;
use crate::progress::ProgressRegistry;

/// Blocking counterpart of `TrackingBodyStream` for `std::io::Read` bodies.
///
/// For network layers that read each response on its own thread. A read of
/// `0` bytes into a non-empty buffer is end-of-stream.
pub struct TrackingReader<R> {
    inner: R,
    state: StreamState,
    registry: Arc<ProgressRegistry>,
}

impl<R> TrackingReader<R> {
    pub fn new(
        url: impl Into<String>,
        content_length: Option<u64>,
        inner: R,
        registry: Arc<ProgressRegistry>,
    ) -> Self {
        Self {
            inner,
            state: StreamState::new(url, content_length),
            registry,
        }
    }

    pub fn url(&self) -> &str {
        self.state.url()
    }

    pub fn bytes_read(&self) -> u64 {
        self.state.bytes_read()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.state.content_length()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for TrackingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if buf.is_empty() {
            return Ok(n);
        }
        let report = if n == 0 {
            self.state.record_end()
        } else {
            Some(self.state.record_chunk(n))
        };
        if let Some((bytes_read, total)) = report {
            self.registry.dispatch(self.state.url(), bytes_read, total);
        }
        Ok(n)
    }
}
