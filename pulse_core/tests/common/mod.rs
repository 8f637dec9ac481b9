#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pulse_core::{Callback, CallbackPoster, ProgressObserver, ProgressRegistry};

/// Runs every posted callback immediately on the posting thread.
pub struct InlinePoster;

impl CallbackPoster for InlinePoster {
    fn post(&self, callback: Callback) {
        futures::executor::block_on(callback);
    }
}

/// Registry whose observers are invoked inline, for deterministic tests.
pub fn inline_registry() -> Arc<ProgressRegistry> {
    Arc::new(ProgressRegistry::new(InlinePoster))
}

/// Records every `(bytes_read, total_bytes)` it is given.
pub struct RecordingObserver {
    granularity: f32,
    calls: Mutex<Vec<(u64, Option<u64>)>>,
}

impl RecordingObserver {
    pub fn new(granularity: f32) -> Arc<Self> {
        Arc::new(Self {
            granularity,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(u64, Option<u64>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bytes_seen(&self) -> Vec<u64> {
        self.calls().into_iter().map(|(bytes, _)| bytes).collect()
    }
}

#[async_trait]
impl ProgressObserver for RecordingObserver {
    async fn on_progress(&self, bytes_read: u64, total_bytes: Option<u64>) {
        self.calls.lock().unwrap().push((bytes_read, total_bytes));
    }

    fn granularity_percent(&self) -> f32 {
        self.granularity
    }
}

/// Generates deterministic test data.
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}
