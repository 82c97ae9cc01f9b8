// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host clock selection and reads.

use cadence_core::clock::Clock;
use cadence_core::time::Timestamp;
use rustix::time::{ClockId, Timespec, clock_gettime};

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// A [`Clock`] backed by `clock_gettime`.
///
/// Defaults to `CLOCK_MONOTONIC`. Use [`with_clock_id`](Self::with_clock_id)
/// when present fences and resync samples are stamped on another clock, so
/// that evidence and scheduling share one timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PosixClock {
    id: ClockId,
}

impl PosixClock {
    /// Returns a clock reading `CLOCK_MONOTONIC`.
    #[must_use]
    pub const fn monotonic() -> Self {
        Self {
            id: ClockId::Monotonic,
        }
    }

    /// Returns a clock reading the given POSIX clock.
    #[must_use]
    pub const fn with_clock_id(id: ClockId) -> Self {
        Self { id }
    }

    /// Returns the POSIX clock this reads.
    #[must_use]
    pub const fn clock_id(self) -> ClockId {
        self.id
    }
}

impl Default for PosixClock {
    fn default() -> Self {
        Self::monotonic()
    }
}

impl Clock for PosixClock {
    fn now(&self) -> Timestamp {
        now_for_clock(self.id)
    }
}

/// Returns the current monotonic time in nanoseconds.
#[must_use]
pub fn now() -> Timestamp {
    now_for_clock(ClockId::Monotonic)
}

fn now_for_clock(id: ClockId) -> Timestamp {
    timespec_to_timestamp(clock_gettime(id))
}

fn timespec_to_timestamp(timespec: Timespec) -> Timestamp {
    let seconds = i128::from(timespec.tv_sec);
    let nanos = i128::from(timespec.tv_nsec).clamp(0, 999_999_999);

    let total = seconds
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(nanos);
    let clamped = total.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
    Timestamp(i64::try_from(clamped).unwrap_or(i64::MAX))
}
