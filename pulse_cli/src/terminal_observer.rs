use async_trait::async_trait;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use pulse_core::{ProgressObserver, ProgressSnapshot};

/// Renders one download's progress as an indicatif bar.
///
/// All bars live under a shared `MultiProgress` so concurrent downloads
/// render cleanly.
pub struct TerminalProgressObserver {
    bar: ProgressBar,
    label: String,
    granularity: f32,
}

impl TerminalProgressObserver {
    pub fn new(multi: &MultiProgress, label: impl Into<String>, granularity: f32) -> Self {
        let label = label.into();
        let style = ProgressStyle::with_template(
            "[{bar:30.cyan/blue}] {bytes}/{total_bytes} ({binary_bytes_per_sec}) ETA {eta} — {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");

        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(style);
        bar.set_message(label.clone());
        Self {
            bar,
            label,
            granularity,
        }
    }
}

#[async_trait]
impl ProgressObserver for TerminalProgressObserver {
    async fn on_progress(&self, bytes_read: u64, total_bytes: Option<u64>) {
        let snapshot = ProgressSnapshot::new(bytes_read, total_bytes);
        if let Some(total) = total_bytes {
            self.bar.set_length(total.max(1));
        }
        self.bar.set_position(bytes_read);
        if snapshot.is_complete() {
            self.bar.finish_with_message(format!(
                "{} done ({})",
                self.label,
                human_bytes(bytes_read)
            ));
        }
    }

    fn granularity_percent(&self) -> f32 {
        self.granularity
    }
}

/// `1536` -> `1.5 KiB`; plain bytes below 1 KiB.
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
