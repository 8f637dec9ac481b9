use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;

use super::state::StreamState;
use crate::progress::ProgressRegistry;

/// Wraps a response body stream and reports consumed bytes to a registry.
///
/// Chunks, errors and the end of the stream are passed through untouched.
/// After every successful chunk, and once at end-of-stream, the running
/// total is handed to `ProgressRegistry::dispatch`; the registry decides
/// whether anyone hears about it. Failed reads are not reported.
pub struct TrackingBodyStream<S> {
    inner: S,
    state: StreamState,
    registry: Arc<ProgressRegistry>,
}

impl<S> TrackingBodyStream<S> {
    pub fn new(
        url: impl Into<String>,
        content_length: Option<u64>,
        inner: S,
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

    /// Declared length of the wrapped body, as given at construction.
    pub fn content_length(&self) -> Option<u64> {
        self.state.content_length()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, B, E> Stream for TrackingBodyStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<B, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                let (bytes_read, total) = this.state.record_chunk(chunk.as_ref().len());
                this.registry.dispatch(this.state.url(), bytes_read, total);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(None) => {
                if let Some((bytes_read, total)) = this.state.record_end() {
                    this.registry.dispatch(this.state.url(), bytes_read, total);
                }
                Poll::Ready(None)
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
