use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::poster::{Callback, CallbackPoster};

/// Cloneable sending side of a `ProgressNotifier`.
///
/// This is the `CallbackPoster` handed to a `ProgressRegistry`. Posting never
/// blocks and works from any thread, with or without a tokio runtime.
#[derive(Clone)]
pub struct NotifierHandle {
    tx: mpsc::UnboundedSender<Callback>,
}

impl CallbackPoster for NotifierHandle {
    fn post(&self, callback: Callback) {
        if self.tx.send(callback).is_err() {
            log::debug!("[ProgressNotifier] notifier stopped, dropping progress callback");
        }
    }
}

/// The single callback context observers are invoked on.
///
/// Runs as one background task and awaits posted callbacks strictly one
/// after another, so callbacks for the same URL arrive in the order the
/// registry posted them.
///
/// # Lifecycle
///
/// | Event                        | Behaviour                               |
/// |------------------------------|-----------------------------------------|
/// | Callback posted              | awaited after every earlier callback    |
/// | All handles dropped          | remaining callbacks drained, then exit  |
/// | Cancellation token triggered | exit without draining (`run_until_cancelled`) |
pub struct ProgressNotifier {
    rx: mpsc::UnboundedReceiver<Callback>,
}

impl ProgressNotifier {
    /// Create a notifier.
    ///
    /// Returns `(handle, notifier)`: the handle goes to the registry, the
    /// notifier is spawned with `run()`.
    pub fn new() -> (NotifierHandle, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (NotifierHandle { tx }, Self { rx })
    }

    /// Run callbacks until every handle has been dropped.
    ///
    /// Returns the number of callbacks that ran.
    pub async fn run(mut self) -> usize {
        let mut delivered = 0;
        while let Some(callback) = self.rx.recv().await {
            callback.await;
            delivered += 1;
        }
        log::debug!("[ProgressNotifier] all handles dropped after {} callbacks", delivered);
        delivered
    }

    /// Like `run`, but also stops as soon as `token` is cancelled.
    ///
    /// A callback that is already running is allowed to finish.
    pub async fn run_until_cancelled(mut self, token: CancellationToken) -> usize {
        let mut delivered = 0;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::debug!("[ProgressNotifier] cancelled after {} callbacks", delivered);
                    break;
                }
                next = self.rx.recv() => match next {
                    Some(callback) => {
                        callback.await;
                        delivered += 1;
                    }
                    None => break,
                },
            }
        }
        delivered
    }
}
