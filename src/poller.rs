//! Fixed-interval polling of label counters

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::MailClient;
use crate::metrics::LabelMetrics;
use crate::models::{LabelBinding, PollReport};

/// Background task that refreshes the label gauges
///
/// The poller is the only writer of gauge values. A failed fetch leaves the
/// label's previous values in place and does not affect the other labels.
pub struct Poller {
    client: Arc<dyn MailClient>,
    bindings: Vec<LabelBinding>,
    metrics: Arc<LabelMetrics>,
    interval: Duration,
}

impl Poller {
    pub fn new(
        client: Arc<dyn MailClient>,
        bindings: Vec<LabelBinding>,
        metrics: Arc<LabelMetrics>,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            bindings,
            metrics,
            interval,
        }
    }

    /// Fetch every bound label once and update its gauges
    pub async fn poll_once(&self) -> PollReport {
        let mut report = PollReport::default();

        for binding in &self.bindings {
            match self.client.get_label(&binding.id).await {
                Ok(counts) => {
                    debug!(
                        "Label '{}': {} threads, {} unread",
                        binding.name, counts.threads_total, counts.threads_unread
                    );
                    if self.metrics.set_counts(&binding.name, counts) {
                        report.updated += 1;
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch label '{}' ({}): {}", binding.name, binding.id, e);
                    self.metrics.record_fetch_error(&binding.name);
                    report.failed += 1;
                }
            }
        }

        self.metrics.record_poll(Utc::now().timestamp());
        report
    }

    /// Poll until `shutdown` turns true.
    ///
    /// The flag is checked before every tick and raced against the sleep
    /// between ticks. A dropped sender counts as no shutdown request.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Polling {} labels every {:?}",
            self.bindings.len(),
            self.interval
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.poll_once().await;
            info!(
                "Scraped {} labels ({} failed)",
                report.updated, report.failed
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Sender gone: nobody can ask us to stop anymore
                        tokio::time::sleep(self.interval).await;
                    }
                }
            }
        }

        info!("Poller stopped");
    }
}
