/// Per-body bookkeeping shared by the stream and reader decorators.
///
/// `OPEN -> (reading)* -> EXHAUSTED`; there is no way back from exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamState {
    url: String,
    bytes_read: u64,
    content_length: Option<u64>,
    exhausted: bool,
}

impl StreamState {
    /// `content_length` is read once from the response and never changes.
    pub fn new(url: impl Into<String>, content_length: Option<u64>) -> Self {
        Self {
            url: url.into(),
            bytes_read: 0,
            content_length,
            exhausted: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Account for a chunk and return the report to dispatch.
    pub(crate) fn record_chunk(&mut self, len: usize) -> (u64, Option<u64>) {
        self.bytes_read = self.bytes_read.saturating_add(len as u64);
        (self.bytes_read, self.content_length)
    }

    /// Account for end-of-stream. Returns `None` if it was already seen.
    ///
    /// The running total is raised to the declared length, covering servers
    /// that sent less than they announced. With no declared length the
    /// running total becomes the total, so the final report is a completion.
    pub(crate) fn record_end(&mut self) -> Option<(u64, Option<u64>)> {
        if self.exhausted {
            return None;
        }
        self.exhausted = true;
        let total = self.content_length.unwrap_or(self.bytes_read);
        self.bytes_read = self.bytes_read.max(total);
        Some((self.bytes_read, Some(total)))
    }
}
