//! Enable Watchdog - process-wide permission for actuators to output
//!
//! The vendor SDK exposes a single global "feed enable" call: every feed lets
//! all actuators in the process keep outputting until `now + duration`. When
//! the deadline passes without a new feed, output is cut at the SDK layer.
//!
//! Here that global is an explicit object. Controllers that should share one
//! watchdog receive the same `Arc<EnableWatchdog>`, so the sharing is visible
//! at construction time.
//!
//! The most recent feed wins: a shorter feed from one controller can bring
//! the deadline forward for all of them. Feeds are serialized, so the stored
//! deadline always belongs to the feed that reached the feeder last.
//!
//! Controllers register their device on build; feeders that enable per
//! device (see [`BusEnableFeeder`](crate::BusEnableFeeder)) enable every
//! registered one.

use crate::device::EnableFeeder;
use crate::error::VendorError;
use parking_lot::Mutex;
use srx_protocol::DeviceId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Shared enable watchdog with an explicit refresh deadline
pub struct EnableWatchdog {
    feeder: Box<dyn EnableFeeder>,
    deadline: Mutex<Option<Instant>>,
    feeds: AtomicU64,
}

impl EnableWatchdog {
    /// Create a watchdog around the given feed primitive
    ///
    /// # Example
    /// ```
    /// # use srx_driver::{EnableFeeder, EnableWatchdog, VendorResult};
    /// # use std::time::Duration;
    /// struct NoopFeeder;
    /// impl EnableFeeder for NoopFeeder {
    ///     fn feed_enable(&self, _duration: Duration) -> VendorResult { Ok(()) }
    /// }
    ///
    /// let watchdog = EnableWatchdog::new(NoopFeeder);
    /// assert!(!watchdog.is_enabled());
    /// ```
    pub fn new(feeder: impl EnableFeeder + 'static) -> Self {
        Self {
            feeder: Box::new(feeder),
            deadline: Mutex::new(None),
            feeds: AtomicU64::new(0),
        }
    }

    /// Convenience for the common shared case
    pub fn shared(feeder: impl EnableFeeder + 'static) -> Arc<Self> {
        Arc::new(Self::new(feeder))
    }

    /// Add a device to the set this watchdog keeps enabled
    pub fn register(&self, device: DeviceId) {
        self.feeder.register(device);
        debug!("Device {} registered with enable watchdog", device);
    }

    /// Permit output for `duration` from now
    ///
    /// The deadline only moves when the underlying feed succeeds. The lock is
    /// held across the feed so concurrent callers cannot store a stale deadline.
    pub fn feed(&self, duration: Duration) -> Result<Instant, VendorError> {
        let mut slot = self.deadline.lock();
        self.feeder.feed_enable(duration)?;

        let deadline = Instant::now() + duration;
        *slot = Some(deadline);
        self.feeds.fetch_add(1, Ordering::Relaxed);
        drop(slot);

        trace!("Enable watchdog fed for {:?}", duration);
        Ok(deadline)
    }

    /// Deadline set by the last successful feed
    pub fn deadline(&self) -> Option<Instant> {
        *self.deadline.lock()
    }

    /// Check if output is currently permitted
    pub fn is_enabled(&self) -> bool {
        self.deadline().is_some_and(|deadline| Instant::now() < deadline)
    }

    /// Time left before output is cut (zero when lapsed or never fed)
    pub fn remaining(&self) -> Duration {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Number of successful feeds
    pub fn feed_count(&self) -> u64 {
        self.feeds.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for EnableWatchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnableWatchdog")
            .field("deadline", &self.deadline())
            .field("feeds", &self.feed_count())
            .finish()
    }
}
