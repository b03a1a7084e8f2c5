use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::availability::{AvailabilityPayload, extract_availability};
use crate::notifier::Notifier;
use crate::watch_types::WatchError;

/// Trait for availability sources, one snapshot per polling cycle
#[async_trait::async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Fetches one availability snapshot
    async fn fetch_availability(&self) -> Result<AvailabilityPayload, WatchError>;
}

/// Configuration for the polling loop
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Dates to alert on when they become reservable, in report order
    pub desired_dates: Vec<NaiveDate>,

    /// Fixed delay between cycles, shared by success and failure
    /// (default: 5 minutes)
    pub poll_interval: Duration,
}

impl WatcherConfig {
    /// Config for the given dates with the default 5-minute interval
    pub fn new(desired_dates: Vec<NaiveDate>) -> Self {
        Self {
            desired_dates,
            poll_interval: Duration::from_secs(300),
        }
    }
}

/// Long-running availability watcher.
///
/// One cycle is fetch → extract → notify → delay, strictly sequential: a new
/// cycle never begins before the previous notify phase has finished. No
/// availability state is carried between cycles; anything still open next
/// cycle is re-reported.
pub struct Watcher {
    source: Arc<dyn AvailabilitySource>,
    notifier: Notifier,
    config: WatcherConfig,
}

impl Watcher {
    /// Create a watcher over a snapshot source and a notifier
    pub fn new(source: Arc<dyn AvailabilitySource>, notifier: Notifier, config: WatcherConfig) -> Self {
        Self {
            source,
            notifier,
            config,
        }
    }

    /// Run cycles until the shutdown flag flips.
    ///
    /// The flag is checked between cycles and interrupts the inter-cycle
    /// delay, so shutdown never waits out a full poll interval. A bad cycle
    /// (fetch failure, malformed payload) is logged and falls through to the
    /// same fixed delay as a good one.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting availability watcher (interval: {:?}, {} desired dates)",
            self.config.poll_interval,
            self.config.desired_dates.len()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle().await;

            tokio::select! {
                _ = sleep(self.config.poll_interval) => {}
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Availability watcher stopped");
    }

    /// One fetch → extract → notify pass. Errors are absorbed here: the loop
    /// must outlive any single bad payload or failed send.
    async fn run_cycle(&self) {
        let payload = match self.source.fetch_availability().await {
            Ok(payload) => payload,
            Err(WatchError::MalformedPayload(detail)) => {
                warn!("Malformed availability payload: {}", detail);
                return;
            }
            Err(e) => {
                warn!("Availability fetch failed: {}", e);
                return;
            }
        };

        match extract_availability(&payload, &self.config.desired_dates) {
            Ok(report) => self.notifier.notify(&report).await,
            Err(e) => warn!("{}", e),
        }
    }
}
