// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vsync prediction contract.
//!
//! The model that turns observed vsync timestamps into predictions (typically
//! a least-squares fit over recent samples) lives outside this crate. The
//! reactor only feeds it evidence and asks it questions through
//! [`VsyncTracker`].

use std::sync::Arc;

use crate::time::{Nanos, Timestamp};

/// Ingests vsync evidence and predicts future vsyncs.
///
/// All methods take `&self`: the reactor calls the tracker from several
/// threads, and implementations synchronize internally.
pub trait VsyncTracker: Send + Sync {
    /// Records one observed or derived vsync timestamp.
    fn add_vsync_timestamp(&self, timestamp: Timestamp);

    /// Predicts the first vsync at or after `time_point`.
    fn next_anticipated_vsync_time_from(&self, time_point: Timestamp) -> Timestamp;

    /// Returns the current best-estimate vsync period.
    fn current_period(&self) -> Nanos;

    /// Hints that the display period is changing to `period`.
    ///
    /// The hint need not take effect atomically with anything else; the
    /// hardware transition is confirmed by later timestamps.
    fn set_period(&self, period: Nanos);
}

impl<T: VsyncTracker + ?Sized> VsyncTracker for Arc<T> {
    #[inline]
    fn add_vsync_timestamp(&self, timestamp: Timestamp) {
        (**self).add_vsync_timestamp(timestamp);
    }

    #[inline]
    fn next_anticipated_vsync_time_from(&self, time_point: Timestamp) -> Timestamp {
        (**self).next_anticipated_vsync_time_from(time_point)
    }

    #[inline]
    fn current_period(&self) -> Nanos {
        (**self).current_period()
    }

    #[inline]
    fn set_period(&self, period: Nanos) {
        (**self).set_period(period);
    }
}
