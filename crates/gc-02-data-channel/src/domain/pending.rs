//! Pending fetch store for widget-side correlation.
//!
//! Maps a listener id to the caller waiting for its reply. The listener id is
//! the only correlation key on the wire, so at most one fetch per listener can
//! be outstanding; a second one is rejected rather than left ambiguous.
//!
//! An entry whose waiter has gone away (the fetch future was dropped) no
//! longer blocks its listener id: the next `register()` reclaims it, and
//! `remove_expired()` sweeps it once its deadline passes.

use crate::error::ClientError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use grid_types::{ChannelFailure, DataResponse, ListenerId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What a waiting fetch receives.
pub type FetchReply = Result<DataResponse, ChannelFailure>;

struct Waiter {
    reply_to: oneshot::Sender<FetchReply>,
    deadline: Instant,
}

impl Waiter {
    fn abandoned(&self) -> bool {
        self.reply_to.is_closed()
    }
}

#[derive(Debug, Default)]
struct Counters {
    registered: AtomicU64,
    completed: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time copy of the pending store counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingStats {
    pub registered: u64,
    pub completed: u64,
    pub timed_out: u64,
    /// Dropped without a reply, including abandoned waiters.
    pub cancelled: u64,
    /// Refused by single-flight or the in-flight limit.
    pub rejected: u64,
    pub in_flight: usize,
}

/// Outstanding fetches keyed by listener id.
pub struct PendingFetches {
    waiters: DashMap<ListenerId, Waiter>,
    default_timeout: Duration,
    max_in_flight: usize,
    counters: Counters,
}

impl PendingFetches {
    /// `max_in_flight` of zero means unbounded.
    #[must_use]
    pub fn new(default_timeout: Duration, max_in_flight: usize) -> Self {
        Self {
            waiters: DashMap::new(),
            default_timeout,
            max_in_flight,
            counters: Counters::default(),
        }
    }

    /// Claim `listener_id` and get the receiver its reply is delivered on.
    pub fn register(
        &self,
        listener_id: &ListenerId,
        timeout: Option<Duration>,
    ) -> Result<oneshot::Receiver<FetchReply>, ClientError> {
        // Soft limit, checked outside the shard lock.
        if self.max_in_flight > 0 && self.waiters.len() >= self.max_in_flight {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(ClientError::Saturated {
                limit: self.max_in_flight,
            });
        }

        let (reply_to, rx) = oneshot::channel();
        let waiter = Waiter {
            reply_to,
            deadline: Instant::now() + timeout.unwrap_or(self.default_timeout),
        };

        match self.waiters.entry(listener_id.clone()) {
            Entry::Occupied(mut occupied) if occupied.get().abandoned() => {
                self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(listener_id = %listener_id, "Reclaimed abandoned fetch");
                occupied.insert(waiter);
            }
            Entry::Occupied(_) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(listener_id = %listener_id, "Fetch already in flight");
                return Err(ClientError::AlreadyInFlight {
                    listener_id: listener_id.clone(),
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(waiter);
            }
        }

        self.counters.registered.fetch_add(1, Ordering::Relaxed);
        Ok(rx)
    }

    /// Hand `reply` to whoever waits on `listener_id`. False when nobody does.
    pub fn complete(&self, listener_id: &ListenerId, reply: FetchReply) -> bool {
        let Some((_, waiter)) = self.waiters.remove(listener_id) else {
            debug!(listener_id = %listener_id, "Reply for unknown or expired fetch");
            return false;
        };

        if waiter.reply_to.send(reply).is_err() {
            self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.counters.completed.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Release `listener_id` without a reply.
    pub fn cancel(&self, listener_id: &ListenerId) -> bool {
        self.release(listener_id, &self.counters.cancelled)
    }

    /// Release `listener_id` after its caller gave up waiting.
    pub fn expire(&self, listener_id: &ListenerId) -> bool {
        self.release(listener_id, &self.counters.timed_out)
    }

    fn release(&self, listener_id: &ListenerId, counter: &AtomicU64) -> bool {
        let removed = self.waiters.remove(listener_id).is_some();
        if removed {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Drop entries past their deadline or with no one waiting on them.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.waiters.retain(|listener_id, waiter| {
            if waiter.abandoned() {
                self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
            } else if now >= waiter.deadline {
                warn!(listener_id = %listener_id, "Sweeping overdue pending fetch");
                self.counters.timed_out.fetch_add(1, Ordering::Relaxed);
            } else {
                return true;
            }
            removed += 1;
            false
        });

        removed
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.waiters.len()
    }

    #[must_use]
    pub fn is_pending(&self, listener_id: &ListenerId) -> bool {
        self.waiters.contains_key(listener_id)
    }

    #[must_use]
    pub fn stats(&self) -> PendingStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        PendingStats {
            registered: load(&self.counters.registered),
            completed: load(&self.counters.completed),
            timed_out: load(&self.counters.timed_out),
            cancelled: load(&self.counters.cancelled),
            rejected: load(&self.counters.rejected),
            in_flight: self.waiters.len(),
        }
    }

    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}
