// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Present-fence model.
//!
//! A present fence signals when a submitted buffer actually reached the
//! screen, which makes its signal time indirect evidence of a vsync. The
//! reactor never looks inside a fence: it only asks [`PresentFence::signal_time`],
//! which answers with the tri-state [`SignalTime`].
//!
//! [`SnapshotFence`] is an in-process fence whose time is applied later,
//! typically by a producer that learns present times out of band.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::time::Timestamp;

/// What a fence currently knows about its signal time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalTime {
    /// The fence has not signalled yet.
    Pending,
    /// The fence signalled at the given time.
    Signalled(Timestamp),
    /// The fence is empty or broken and will never signal.
    Invalid,
}

/// A handle to a platform present fence.
pub trait PresentFence: Send + Sync {
    /// Returns the fence's current signal state. Must not block.
    fn signal_time(&self) -> SignalTime;
}

/// Shared fence handle as accepted by
/// [`VsyncReactor::add_present_fence`](crate::reactor::VsyncReactor::add_present_fence).
pub type SharedFence = Arc<dyn PresentFence>;

const PENDING: i64 = i64::MAX;
const INVALID: i64 = i64::MIN;

/// A fence backed by an atomic snapshot of its signal time.
///
/// `i64::MAX` and `i64::MIN` are reserved as the pending and invalid markers,
/// so [`signal`](Self::signal) clamps times into the open range between them.
pub struct SnapshotFence {
    state: AtomicI64,
}

impl SnapshotFence {
    /// Creates a fence that has not signalled yet.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            state: AtomicI64::new(PENDING),
        }
    }

    /// Creates a fence that already signalled at `at`.
    #[must_use]
    pub const fn signalled(at: Timestamp) -> Self {
        Self {
            state: AtomicI64::new(clamp_signal(at.0)),
        }
    }

    /// Creates a fence that will never signal.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            state: AtomicI64::new(INVALID),
        }
    }

    /// Records that the fence signalled at `at`.
    ///
    /// Later calls overwrite earlier ones; the snapshot is trusted as-is.
    pub fn signal(&self, at: Timestamp) {
        self.state.store(clamp_signal(at.0), Ordering::Release);
    }

    /// Marks the fence as broken; it will never signal.
    pub fn invalidate(&self) {
        self.state.store(INVALID, Ordering::Release);
    }
}

const fn clamp_signal(t: i64) -> i64 {
    if t >= PENDING {
        PENDING - 1
    } else if t <= INVALID {
        INVALID + 1
    } else {
        t
    }
}

impl PresentFence for SnapshotFence {
    fn signal_time(&self) -> SignalTime {
        match self.state.load(Ordering::Acquire) {
            PENDING => SignalTime::Pending,
            INVALID => SignalTime::Invalid,
            t => SignalTime::Signalled(Timestamp(t)),
        }
    }
}

impl fmt::Debug for SnapshotFence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SnapshotFence")
            .field(&self.signal_time())
            .finish()
    }
}
