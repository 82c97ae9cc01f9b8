// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded backlog of present fences that have not signalled yet.

use std::collections::VecDeque;

use crate::fence::{SharedFence, SignalTime};
use crate::time::Timestamp;

/// What happened to a queued fence during [`PendingFenceQueue::drain_resolved`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// The fence signalled; its time must reach the tracker.
    Signalled(Timestamp),
    /// The fence turned out to be invalid and was dropped.
    Dropped,
}

/// FIFO of unsignalled present fences with a `drop_oldest` overflow policy.
///
/// Once the queue holds `limit` fences, pushing another evicts the oldest.
/// Evicted fences are never flushed, so their timestamps are lost.
pub(crate) struct PendingFenceQueue {
    fences: VecDeque<SharedFence>,
    limit: usize,
    evicted_count: u64,
}

impl PendingFenceQueue {
    /// `limit == 0` is promoted to `1`.
    pub(crate) fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            fences: VecDeque::with_capacity(limit),
            limit,
            evicted_count: 0,
        }
    }

    /// Enqueues `fence`, returning the evicted oldest fence on overflow.
    pub(crate) fn push(&mut self, fence: SharedFence) -> Option<SharedFence> {
        let evicted = if self.fences.len() == self.limit {
            self.evicted_count += 1;
            self.fences.pop_front()
        } else {
            None
        };
        self.fences.push_back(fence);
        evicted
    }

    /// Removes every fence whose signal state is now known, oldest first,
    /// reporting each one to `on_resolved`. Pending fences keep their order.
    pub(crate) fn drain_resolved(&mut self, mut on_resolved: impl FnMut(Resolved)) {
        self.fences.retain(|fence| match fence.signal_time() {
            SignalTime::Pending => true,
            SignalTime::Signalled(t) => {
                on_resolved(Resolved::Signalled(t));
                false
            }
            SignalTime::Invalid => {
                on_resolved(Resolved::Dropped);
                false
            }
        });
    }

    pub(crate) fn clear(&mut self) {
        self.fences.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.fences.len()
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) fn evicted_count(&self) -> u64 {
        self.evicted_count
    }
}

impl core::fmt::Debug for PendingFenceQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingFenceQueue")
            .field("len", &self.fences.len())
            .field("limit", &self.limit)
            .field("evicted_count", &self.evicted_count)
            .finish_non_exhaustive()
    }
}
