// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callback dispatch contract.
//!
//! A [`VsyncDispatch`] owns the timer that actually sleeps and fires
//! callbacks. Callers register a named callback once, then ask for one firing
//! at a time with [`schedule`](VsyncDispatch::schedule):
//!
//! ```text
//!   earliest_vsync          target vsync
//!        │                       │
//!   ─────┼───────────────────────┼──────►
//!                  ◄─────────────┤
//!                   work_duration
//!                  ▲
//!                  callback fires here, with the target vsync time
//! ```
//!
//! The callback receives the time of the vsync it was scheduled against.
//! Scheduling again before the pending firing happens replaces it.

use core::fmt;
use std::sync::Arc;

use crate::time::{Nanos, Timestamp};

/// Opaque handle for a registered dispatch callback.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackToken(pub u64);

impl fmt::Debug for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackToken({})", self.0)
    }
}

/// A callback registered with a [`VsyncDispatch`].
///
/// Invoked on the dispatcher's timer thread with the target vsync time.
pub type DispatchCallback = Arc<dyn Fn(Timestamp) + Send + Sync>;

/// Outcome of a successful [`VsyncDispatch::cancel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CancelResult {
    /// A pending firing existed and was removed.
    Cancelled,
    /// Nothing was pending: the callback already fired or is firing now.
    TooLate,
}

/// Errors reported by a [`VsyncDispatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatcher could not find a firing time for the request.
    CannotSchedule,
    /// The token is not (or no longer) registered.
    UnknownToken(CallbackToken),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CannotSchedule => write!(f, "dispatcher could not schedule the callback"),
            Self::UnknownToken(token) => write!(f, "callback token {} is not registered", token.0),
        }
    }
}

impl core::error::Error for DispatchError {}

/// Fires registered callbacks ahead of predicted vsyncs.
pub trait VsyncDispatch: Send + Sync {
    /// Registers `callback` under a diagnostic `name`. Does not schedule.
    fn register_callback(&self, callback: DispatchCallback, name: &str) -> CallbackToken;

    /// Permanently removes the callback behind `token`.
    fn unregister_callback(&self, token: CallbackToken);

    /// Requests one firing `work_duration` before the first vsync at or after
    /// `earliest_vsync`, replacing any pending firing for `token`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if no firing could be arranged.
    fn schedule(
        &self,
        token: CallbackToken,
        work_duration: Nanos,
        earliest_vsync: Timestamp,
    ) -> Result<(), DispatchError>;

    /// Cancels the pending firing for `token`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownToken`] if `token` is not registered.
    fn cancel(&self, token: CallbackToken) -> Result<CancelResult, DispatchError>;
}

impl<T: VsyncDispatch + ?Sized> VsyncDispatch for Arc<T> {
    #[inline]
    fn register_callback(&self, callback: DispatchCallback, name: &str) -> CallbackToken {
        (**self).register_callback(callback, name)
    }

    #[inline]
    fn unregister_callback(&self, token: CallbackToken) {
        (**self).unregister_callback(token);
    }

    #[inline]
    fn schedule(
        &self,
        token: CallbackToken,
        work_duration: Nanos,
        earliest_vsync: Timestamp,
    ) -> Result<(), DispatchError> {
        (**self).schedule(token, work_duration, earliest_vsync)
    }

    #[inline]
    fn cancel(&self, token: CallbackToken) -> Result<CancelResult, DispatchError> {
        (**self).cancel(token)
    }
}
