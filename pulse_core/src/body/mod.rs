//! Decorators that count body bytes as the consumer reads them.

pub mod state;
pub mod tracking_reader;
pub mod tracking_stream;

pub use state::StreamState;
pub use tracking_reader::TrackingReader;
pub use tracking_stream::TrackingBodyStream;
