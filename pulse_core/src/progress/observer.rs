use async_trait::async_trait;
use tokio::sync::mpsc;

use super::snapshot::ProgressSnapshot;

/// Trait for anything that wants to observe download progress for one URL.
///
/// Observers are registered with a `ProgressRegistry` under a URL key. The
/// registry decides when an update is worth delivering and posts
/// `on_progress` to its callback context, so an observer is never invoked
/// concurrently with itself and never on the thread doing the network read.
///
/// Lifecycle:
/// - `granularity_percent` is queried once for every progress report.
/// - `on_progress` is called at the first report, whenever progress crosses
///   into a new granularity bucket, and once at completion. After the
///   completion call the observer is no longer registered.
#[async_trait]
pub trait ProgressObserver: Send + Sync + 'static {
    /// Called with the running byte count and the declared body length.
    async fn on_progress(&self, bytes_read: u64, total_bytes: Option<u64>);

    /// How often the observer wants updates, in percent of the total length.
    /// `0.2` asks for an update roughly every 0.2 percent; `0.0` asks for
    /// every read. The first and the final update are always delivered.
    fn granularity_percent(&self) -> f32;
}

/// Forwards every delivered update into an unbounded channel.
///
/// Handy for consumers that would rather `recv().await` progress than
/// implement the trait themselves.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<ProgressSnapshot>,
    granularity: f32,
}

impl ChannelObserver {
    /// Creates a new observer and the receiver that yields its updates.
    pub fn new(granularity: f32) -> (Self, mpsc::UnboundedReceiver<ProgressSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, granularity }, rx)
    }
}

#[async_trait]
impl ProgressObserver for ChannelObserver {
    async fn on_progress(&self, bytes_read: u64, total_bytes: Option<u64>) {
        // send() only fails once the receiver is gone; nobody is listening then.
        let _ = self.tx.send(ProgressSnapshot::new(bytes_read, total_bytes));
    }

    fn granularity_percent(&self) -> f32 {
        self.granularity
    }
}
