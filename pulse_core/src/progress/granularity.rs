//! The throttling rule deciding which progress reports reach an observer.
//!
//! Progress is split into buckets of `granularity` percent. A report is
//! delivered when it lands in a different bucket than the last delivered
//! one, and unconditionally at the start (0 bytes), at completion, and when
//! the observer asked for a granularity of zero.

/// Outcome of checking one progress report against the stored bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the observer should be invoked.
    pub dispatch: bool,
    /// Bucket to remember for the next report when `dispatch` is true.
    /// `None` when bucketing is disabled (zero granularity).
    pub bucket: Option<u64>,
}

/// Negative, NaN and infinite granularities behave like zero.
fn sanitize(granularity: f32) -> f64 {
    if granularity.is_finite() && granularity > 0.0 {
        granularity as f64
    } else {
        0.0
    }
}

/// Bucket index of a report, `floor(percent / granularity)`.
///
/// Every report of a body with an unknown (or zero) length falls into
/// bucket 0, so such bodies only report their first read and completion.
pub fn bucket_for(bytes_read: u64, total_bytes: Option<u64>, granularity: f32) -> Option<u64> {
    let granularity = sanitize(granularity);
    if granularity == 0.0 {
        return None;
    }
    match total_bytes {
        Some(total) if total > 0 => {
            let percent = 100.0 * bytes_read as f64 / total as f64;
            Some((percent / granularity).floor() as u64)
        }
        _ => Some(0),
    }
}

/// Decide whether a report should be delivered, given the last stored bucket.
pub fn needs_dispatch(
    last_bucket: Option<u64>,
    bytes_read: u64,
    total_bytes: Option<u64>,
    granularity: f32,
) -> Decision {
    let bucket = bucket_for(bytes_read, total_bytes, granularity);
    let forced = bucket.is_none() || bytes_read == 0 || total_bytes == Some(bytes_read);
    Decision {
        dispatch: forced || bucket != last_bucket,
        bucket,
    }
}
