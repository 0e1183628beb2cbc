//! Status publisher
//!
//! Periodically captures the device state into a `StatusDocument` and writes
//! it atomically to the status file, so unprivileged tools can read telemetry
//! without opening the hidraw node.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use of_core::{OctoDevice, StatusDocument};

use crate::reader::ReaderStats;

/// Consecutive write failures before the error is logged at error level
const MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Publisher state carried between ticks
#[derive(Debug, Default)]
pub struct Publisher {
    status_file: Option<PathBuf>,
    was_fresh: Option<bool>,
    consecutive_errors: u32,
}

impl Publisher {
    pub fn new(status_file: Option<PathBuf>) -> Self {
        Self {
            status_file,
            ..Default::default()
        }
    }

    /// Capture and write one document; returns it for logging and tests
    pub fn publish_once(&mut self, device: &OctoDevice) -> StatusDocument {
        let doc = StatusDocument::capture(device);
        self.note_freshness(&doc);

        if let Some(path) = &self.status_file {
            match doc.write_to(path) {
                Ok(()) => {
                    if self.consecutive_errors > 0 {
                        info!("Status file writable again after {} failures", self.consecutive_errors);
                    }
                    self.consecutive_errors = 0;
                }
                Err(e) => {
                    self.consecutive_errors += 1;
                    if self.consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("Cannot write status file {}: {}", path.display(), e);
                    } else {
                        warn!("Status write failed ({}): {}", self.consecutive_errors, e);
                    }
                }
            }
        }
        doc
    }

    fn note_freshness(&mut self, doc: &StatusDocument) {
        match (self.was_fresh, doc.fresh) {
            (Some(false) | None, true) => info!(
                "Receiving reports from {} (serial {}, firmware {})",
                doc.device, doc.serial_number, doc.firmware_version
            ),
            (Some(true), false) => warn!("Telemetry went stale - no report for {:?} ms", doc.age_ms),
            _ => {}
        }
        self.was_fresh = Some(doc.fresh);
    }

    pub fn status_file(&self) -> Option<&Path> {
        self.status_file.as_deref()
    }
}

/// Publish on every `interval` tick until `shutdown` is set
pub async fn run_publisher(
    device: Arc<OctoDevice>,
    mut publisher: Publisher,
    interval: Duration,
    stats: Arc<ReaderStats>,
    shutdown: Arc<AtomicBool>,
) {
    info!("Status publisher started (interval {} ms)", interval.as_millis());
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while !shutdown.load(Ordering::SeqCst) {
        ticker.tick().await;
        publisher.publish_once(&device);

        let (applied, ignored, malformed, reopens) = stats.summary();
        debug!(applied, ignored, malformed, reopens, "reader stats");
    }

    if let Some(path) = publisher.status_file() {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", path.display(), e),
        }
    }
    info!("Status publisher stopped");
}
