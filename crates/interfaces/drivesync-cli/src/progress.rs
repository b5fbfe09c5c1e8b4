use std::collections::HashMap;

use drivesync_pipeline::DownloadEvent;
use humansize::{format_size, DECIMAL};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::mpsc::Receiver;

/// Renders one percentage bar per in-flight download.
pub struct ProgressView {
    multi: MultiProgress,
    style: ProgressStyle,
    bars: HashMap<u64, (String, ProgressBar)>,
}

impl ProgressView {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template("{msg:30!} [{bar:40.cyan/blue}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        Self {
            multi: MultiProgress::new(),
            style,
            bars: HashMap::new(),
        }
    }

    pub fn hidden() -> Self {
        let view = Self::new();
        view.multi
            .set_draw_target(indicatif::ProgressDrawTarget::hidden());
        view
    }

    /// The bar set, for writers that must print around the bars.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }

    pub fn handle(&mut self, ev: DownloadEvent) {
        match ev {
            DownloadEvent::Started { id, name, .. } => {
                let pb = self.multi.add(ProgressBar::new(100));
                pb.set_style(self.style.clone());
                pb.set_message(name.clone());
                self.bars.insert(id, (name, pb));
            }
            DownloadEvent::Progress { id, percent, .. } => {
                if let Some((_, pb)) = self.bars.get(&id) {
                    pb.set_position(u64::from(percent));
                }
            }
            DownloadEvent::Completed { id, bytes } => {
                if let Some((name, pb)) = self.bars.remove(&id) {
                    pb.set_position(100);
                    pb.finish_with_message(format!("{name} ({})", format_size(bytes, DECIMAL)));
                }
            }
            DownloadEvent::Failed { id, bytes, .. } => {
                if let Some((name, pb)) = self.bars.remove(&id) {
                    pb.abandon_with_message(format!(
                        "{name} failed after {}",
                        format_size(bytes, DECIMAL)
                    ));
                }
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.bars.len()
    }

    /// Consumes events until every sender is dropped.
    pub async fn drive(mut self, mut rx: Receiver<DownloadEvent>) {
        while let Some(ev) = rx.recv().await {
            self.handle(ev);
        }
    }
}

impl Default for ProgressView {
    fn default() -> Self {
        Self::new()
    }
}
