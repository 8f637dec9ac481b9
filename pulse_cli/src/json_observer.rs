use async_trait::async_trait;
use serde::Serialize;

use pulse_core::{ProgressObserver, ProgressSnapshot};

#[derive(Serialize)]
struct ProgressLine<'a> {
    url: &'a str,
    #[serde(flatten)]
    snapshot: ProgressSnapshot,
    percent: Option<f64>,
    complete: bool,
}

/// Prints every delivered update as one JSON object per line on stdout.
pub struct JsonLineObserver {
    url: String,
    granularity: f32,
}

impl JsonLineObserver {
    pub fn new(url: impl Into<String>, granularity: f32) -> Self {
        Self {
            url: url.into(),
            granularity,
        }
    }

    fn render(&self, snapshot: ProgressSnapshot) -> serde_json::Result<String> {
        serde_json::to_string(&ProgressLine {
            url: &self.url,
            snapshot,
            percent: snapshot.percent(),
            complete: snapshot.is_complete(),
        })
    }
}

#[async_trait]
impl ProgressObserver for JsonLineObserver {
    async fn on_progress(&self, bytes_read: u64, total_bytes: Option<u64>) {
        match self.render(ProgressSnapshot::new(bytes_read, total_bytes)) {
            Ok(line) => println!("{}", line),
            Err(e) => log::warn!("[JsonLineObserver] failed to encode progress: {}", e),
        }
    }

    fn granularity_percent(&self) -> f32 {
        self.granularity
    }
}
