use serde::Serialize;

/// A single progress report as delivered to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub bytes_read: u64,
    /// `None` when the response did not declare its length.
    pub total_bytes: Option<u64>,
}

impl ProgressSnapshot {
    pub fn new(bytes_read: u64, total_bytes: Option<u64>) -> Self {
        Self {
            bytes_read,
            total_bytes,
        }
    }

    /// Percentage of the declared length read so far, if the length is known.
    pub fn percent(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(100.0),
            Some(total) => Some(100.0 * self.bytes_read as f64 / total as f64),
            None => None,
        }
    }

    /// True once the declared length has been reached.
    pub fn is_complete(&self) -> bool {
        self.total_bytes.is_some_and(|total| total <= self.bytes_read)
    }
}
