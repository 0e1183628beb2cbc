//! Sensor state cache
//!
//! Holds the most recent snapshot and the instant it was installed. One lock
//! guards both, so a reader sees either the old snapshot with the old
//! timestamp or the new one with the new timestamp. Snapshots are shared as
//! `Arc`s; readers that need several channels from the same report clone the
//! `Arc` and drop the lock right away.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::data::{DeviceInfo, SensorType, Snapshot};
use crate::error::{OctoError, Result};

/// Source of monotonic time
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// `Instant::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    snapshot: Arc<Snapshot>,
    /// `None` until the first report arrives
    updated: Option<Instant>,
}

/// Snapshot and timing taken under one lock acquisition
#[derive(Debug, Clone)]
pub struct CacheView {
    /// Latest snapshot, whether fresh or not
    pub snapshot: Arc<Snapshot>,
    /// Time since it was installed, `None` if there never was one
    pub age: Option<Duration>,
    pub fresh: bool,
}

pub struct SensorCache {
    entry: RwLock<CacheEntry>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl SensorCache {
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock))
    }

    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entry: RwLock::new(CacheEntry {
                snapshot: Arc::new(Snapshot::default()),
                updated: None,
            }),
            window,
            clock,
        }
    }

    /// Install a new snapshot and mark it as taken now
    pub fn replace(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        let now = self.clock.now();
        let mut entry = self.entry.write();
        entry.snapshot = snapshot;
        entry.updated = Some(now);
    }

    /// Read one channel
    ///
    /// Index is checked first, so an invalid channel reports
    /// `ChannelOutOfRange` whether or not data is fresh.
    pub fn read(&self, sensor: SensorType, index: usize) -> Result<i64> {
        sensor.check_index(index)?;
        let entry = self.entry.read();
        self.check_fresh(entry.updated)?;
        entry
            .snapshot
            .value(sensor, index)
            .ok_or_else(|| OctoError::out_of_range(sensor.hwmon_prefix(), index, sensor.channel_count()))
    }

    /// The whole current snapshot, if fresh
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let entry = self.entry.read();
        self.check_fresh(entry.updated)?;
        Ok(Arc::clone(&entry.snapshot))
    }

    /// Snapshot, age and freshness as of one instant
    ///
    /// Everything in the view belongs to the same report, so a publisher
    /// building a document from it never mixes two reports.
    pub fn view(&self) -> CacheView {
        let entry = self.entry.read();
        let now = self.clock.now();
        let age = entry.updated.map(|at| now.saturating_duration_since(at));
        CacheView {
            snapshot: Arc::clone(&entry.snapshot),
            age,
            fresh: matches!(age, Some(age) if age <= self.window),
        }
    }

    /// Auxiliary identifiers from the latest report, fresh or not
    pub fn info(&self) -> DeviceInfo {
        self.entry.read().snapshot.info
    }

    pub fn last_updated(&self) -> Option<Instant> {
        self.entry.read().updated
    }

    /// Time since the last report, `None` if there never was one
    pub fn age(&self) -> Option<Duration> {
        let updated = self.last_updated()?;
        Some(self.clock.now().saturating_duration_since(updated))
    }

    pub fn is_fresh(&self) -> bool {
        self.check_fresh(self.last_updated()).is_ok()
    }

    pub fn freshness_window(&self) -> Duration {
        self.window
    }

    fn check_fresh(&self, updated: Option<Instant>) -> Result<()> {
        match updated {
            Some(at) if self.clock.now().saturating_duration_since(at) <= self.window => Ok(()),
            _ => Err(OctoError::Stale),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Clock that only moves when told to
    pub struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Instant::now()),
            })
        }

        pub fn advance(&self, by: Duration) {
            *self.now.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;

    const WINDOW: Duration = Duration::from_secs(2);

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.temperatures[0] = 2480;
        snapshot.speeds[1] = 3028;
        snapshot.info.power_cycles = 9;
        snapshot
    }

    #[test]
    fn test_stale_before_first_report() {
        let cache = SensorCache::new(WINDOW);
        assert!(matches!(cache.read(SensorType::Temperature, 0), Err(OctoError::Stale)));
        assert!(matches!(cache.snapshot(), Err(OctoError::Stale)));
        assert!(!cache.is_fresh());
        assert_eq!(cache.age(), None);
    }

    #[test]
    fn test_fresh_within_window() {
        let clock = ManualClock::new();
        let cache = SensorCache::with_clock(WINDOW, clock.clone());
        cache.replace(sample());

        clock.advance(Duration::from_millis(1500));
        assert_eq!(cache.read(SensorType::Temperature, 0).unwrap(), 2480);
        assert_eq!(cache.read(SensorType::Speed, 1).unwrap(), 3028);

        clock.advance(Duration::from_millis(500));
        assert!(cache.is_fresh(), "exactly at the window edge is still fresh");
        assert_eq!(cache.age(), Some(WINDOW));
    }

    #[test]
    fn test_stale_after_window() {
        let clock = ManualClock::new();
        let cache = SensorCache::with_clock(WINDOW, clock.clone());
        cache.replace(sample());

        clock.advance(WINDOW + Duration::from_millis(1));
        assert!(matches!(cache.read(SensorType::Speed, 1), Err(OctoError::Stale)));

        cache.replace(sample());
        assert_eq!(cache.read(SensorType::Speed, 1).unwrap(), 3028);
    }

    #[test]
    fn test_out_of_range_regardless_of_freshness() {
        let cache = SensorCache::new(WINDOW);
        assert!(matches!(
            cache.read(SensorType::Temperature, 4),
            Err(OctoError::ChannelOutOfRange { index: 4, count: 4, .. })
        ));

        cache.replace(sample());
        assert!(matches!(
            cache.read(SensorType::Power, 8),
            Err(OctoError::ChannelOutOfRange { index: 8, count: 8, .. })
        ));
    }

    #[test]
    fn test_view_tracks_freshness() {
        let clock = ManualClock::new();
        let cache = SensorCache::with_clock(WINDOW, clock.clone());

        let view = cache.view();
        assert!(!view.fresh);
        assert_eq!(view.age, None);

        cache.replace(sample());
        clock.advance(WINDOW);
        let view = cache.view();
        assert!(view.fresh);
        assert_eq!(view.age, Some(WINDOW));
        assert_eq!(view.snapshot.info.power_cycles, 9);

        clock.advance(Duration::from_millis(1));
        let view = cache.view();
        assert!(!view.fresh);
        assert_eq!(view.snapshot.temperatures[0], 2480);
    }

    #[test]
    fn test_info_ignores_freshness() {
        let clock = ManualClock::new();
        let cache = SensorCache::with_clock(WINDOW, clock.clone());
        assert_eq!(cache.info(), DeviceInfo::default());

        cache.replace(sample());
        clock.advance(Duration::from_secs(60));
        assert!(!cache.is_fresh());
        assert_eq!(cache.info().power_cycles, 9);
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let cache = SensorCache::new(WINDOW);
        cache.replace(sample());
        let held = cache.snapshot().unwrap();

        let mut next = sample();
        next.temperatures[0] = 3000;
        cache.replace(next);

        assert_eq!(held.temperatures[0], 2480);
        assert_eq!(cache.read(SensorType::Temperature, 0).unwrap(), 3000);
    }
}
