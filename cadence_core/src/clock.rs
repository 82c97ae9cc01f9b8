// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic time source.
//!
//! [`Clock`] is the reactor's only view of "now". Platform crates provide a
//! real implementation (e.g. `cadence_backend_posix::PosixClock`);
//! [`ManualClock`] is a settable clock for tests and simulations.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::time::{Nanos, Timestamp};

/// A monotonic, infallible time source.
pub trait Clock: Send + Sync {
    /// Returns the current time. Successive calls never go backwards.
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub const fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(start.0),
        }
    }

    /// Moves the clock to `t`.
    ///
    /// Callers are responsible for keeping the clock monotonic.
    pub fn set(&self, t: Timestamp) {
        self.now.store(t.0, Ordering::Release);
    }

    /// Moves the clock forward by `by` and returns the new reading.
    pub fn advance(&self, by: Nanos) -> Timestamp {
        let step = |t: i64| t.saturating_add(by.0);
        let prev = match self
            .now
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| Some(step(t)))
        {
            Ok(prev) | Err(prev) => prev,
        };
        Timestamp(step(prev))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::Acquire))
    }
}
