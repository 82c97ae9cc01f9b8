// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic timestamps and signed nanosecond durations.
//!
//! [`Timestamp`] is a point on the compositor's monotonic timeline, in
//! nanoseconds. [`Nanos`] is a signed span on the same timeline: periods,
//! phase offsets and work durations are all expressed with it. Phase offsets
//! may be negative, which is why both types are signed.
//!
//! The operator impls panic on overflow in debug builds like the integer
//! types they wrap. Scheduling code uses the `saturating_*` helpers instead.

use core::fmt;
use core::ops::{Add, Neg, Sub};

/// A point on the monotonic timeline, in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// Adds a duration, clamping at the bounds of the timeline.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, duration: Nanos) -> Self {
        Self(self.0.saturating_add(duration.0))
    }

    /// Subtracts a duration, clamping at the bounds of the timeline.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, duration: Nanos) -> Self {
        Self(self.0.saturating_sub(duration.0))
    }

    /// Returns the signed span from `earlier` to `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> Nanos {
        Nanos(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Nanos> for Timestamp {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Nanos) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub<Nanos> for Timestamp {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Nanos) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sub for Timestamp {
    type Output = Nanos;

    #[inline]
    fn sub(self, rhs: Self) -> Nanos {
        Nanos(self.0 - rhs.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// A signed span of time in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Nanos(pub i64);

impl Nanos {
    /// A zero-length span.
    pub const ZERO: Self = Self(0);

    /// Creates a span from whole microseconds.
    #[inline]
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros.saturating_mul(1_000))
    }

    /// Creates a span from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns the span in fractional microseconds, for display.
    #[inline]
    #[must_use]
    pub fn as_micros_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Saturating multiplication by a whole count, e.g. a number of periods.
    #[inline]
    #[must_use]
    pub const fn saturating_mul(self, count: i64) -> Self {
        Self(self.0.saturating_mul(count))
    }
}

impl Add for Nanos {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Nanos {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Nanos {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Debug for Nanos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nanos({})", self.0)
    }
}
