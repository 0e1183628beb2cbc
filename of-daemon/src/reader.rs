//! Report reader thread
//!
//! hidraw reads block until the next report arrives, so the reader runs on
//! its own OS thread rather than on the async runtime. It is the only writer
//! of the device cache.
//!
//! # Recovery
//! - **Unplug / read error**: reopen the node after `READ_RETRY_DELAY`
//! - **Malformed report**: count it and keep reading
//! - **Shutdown**: checked between reports; a blocked read ends with the next report

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

use of_core::constants::{device, timing};
use of_core::{pump, FrameOutcome, FrameSource, OctoDevice, OctoError, ReportReader};

/// Counters shared with the publisher for log lines
#[derive(Debug, Default)]
pub struct ReaderStats {
    pub applied: AtomicU64,
    pub ignored: AtomicU64,
    pub malformed: AtomicU64,
    pub reopens: AtomicU64,
}

impl ReaderStats {
    fn record(&self, outcome: FrameOutcome) {
        match outcome {
            FrameOutcome::Updated => self.applied.fetch_add(1, Ordering::Relaxed),
            FrameOutcome::Ignored { .. } => self.ignored.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn summary(&self) -> (u64, u64, u64, u64) {
        (
            self.applied.load(Ordering::Relaxed),
            self.ignored.load(Ordering::Relaxed),
            self.malformed.load(Ordering::Relaxed),
            self.reopens.load(Ordering::Relaxed),
        )
    }
}

/// How a source stopped yielding frames
#[derive(Debug, PartialEq, Eq)]
enum StreamEnd {
    Shutdown,
    Closed,
    Failed,
}

/// Spawn the reader thread for the hidraw node at `path`
pub fn spawn_reader(
    device: Arc<OctoDevice>,
    path: PathBuf,
    stats: Arc<ReaderStats>,
    shutdown: Arc<AtomicBool>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("octo-reader".to_string())
        .spawn(move || run_reader(&device, &path, &stats, &shutdown))
}

fn run_reader(device: &OctoDevice, path: &Path, stats: &ReaderStats, shutdown: &AtomicBool) {
    info!("Report reader starting on {}", path.display());
    let mut open_failures: u32 = 0;

    while !shutdown.load(Ordering::SeqCst) {
        let mut source = match ReportReader::open(path) {
            Ok(source) => {
                if open_failures > 0 {
                    info!("Reopened {} after {} attempts", path.display(), open_failures);
                }
                open_failures = 0;
                source
            }
            Err(e) => {
                open_failures += 1;
                if open_failures == 1 {
                    warn!("Cannot open {}: {} - retrying", path.display(), e);
                } else {
                    debug!("Open attempt {} failed: {}", open_failures, e);
                }
                thread::sleep(timing::READ_RETRY_DELAY);
                continue;
            }
        };

        match read_until_end(&mut source, device, stats, shutdown) {
            StreamEnd::Shutdown => break,
            StreamEnd::Closed => warn!("{} closed - device unplugged?", path.display()),
            StreamEnd::Failed => {}
        }
        stats.reopens.fetch_add(1, Ordering::Relaxed);
        thread::sleep(timing::READ_RETRY_DELAY);
    }

    info!("Report reader stopped");
}

fn read_until_end<S: FrameSource + ?Sized>(
    source: &mut S,
    device: &OctoDevice,
    stats: &ReaderStats,
    shutdown: &AtomicBool,
) -> StreamEnd {
    let mut buf = vec![0u8; device::MAX_REPORT_LEN];

    loop {
        if shutdown.load(Ordering::SeqCst) {
            return StreamEnd::Shutdown;
        }
        match pump(source, device, &mut buf) {
            Ok(Some(outcome)) => stats.record(outcome),
            Ok(None) => return StreamEnd::Closed,
            Err(OctoError::MalformedFrame { .. }) => {
                stats.malformed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error!("Report read failed: {}", e);
                return StreamEnd::Failed;
            }
        }
    }
}
