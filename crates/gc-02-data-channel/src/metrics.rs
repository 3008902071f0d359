//! Channel counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for the data-fetch channel.
#[derive(Debug, Default)]
pub struct ChannelStats {
    pub received: AtomicU64,
    pub responded: AtomicU64,
    pub suppressed: AtomicU64,
    pub failed: AtomicU64,
    /// Subset of `failed` caused by the producer timeout
    pub timed_out: AtomicU64,
}

/// Point-in-time copy of [`ChannelStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStatsSnapshot {
    pub received: u64,
    pub responded: u64,
    pub suppressed: u64,
    pub failed: u64,
    pub timed_out: u64,
}

impl ChannelStats {
    #[must_use]
    pub fn snapshot(&self) -> ChannelStatsSnapshot {
        ChannelStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            responded: self.responded.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
        }
    }
}

impl ChannelStatsSnapshot {
    /// Requests that reached a terminal state.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.responded + self.suppressed + self.failed
    }
}
