// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the reactor.
//!
//! This module provides a [`TraceSink`] trait with one method per reactor
//! event. All method bodies default to no-ops, so implementing only the events
//! you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink and is what the reactor calls into.
//! When the `trace` feature is **off**, every `Tracer` method compiles to
//! nothing and installed sinks are dropped. When **on**, each method performs a
//! single `Option` branch before dispatching.
//!
//! Events are emitted while the reactor holds its lock. Sinks must not call
//! back into the reactor.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::dispatch::{CallbackToken, CancelResult, DispatchError};
use crate::listener::ListenerId;
use crate::time::{Nanos, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happened to a present fence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FenceEventKind {
    /// Fence arrived while present fences are being ignored.
    Ignored,
    /// Fence will never signal; the caller was told more information is needed.
    Invalid,
    /// Fence had already signalled; its time went straight to the tracker.
    Signalled,
    /// Fence has not signalled yet and was queued.
    Queued,
    /// A queued fence signalled and its time was flushed to the tracker.
    Flushed,
    /// A queued fence was pushed out by a newer one before it signalled.
    Evicted,
    /// A queued fence turned out to be invalid and was discarded.
    Dropped,
}

/// What happened to a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerEventKind {
    /// First registration with the dispatcher.
    Registered,
    /// Phase updated on an active listener.
    PhaseChanged,
    /// Removed by the consumer.
    Removed,
    /// Phase change requested for a listener that was already removed.
    RetiredPhaseChange,
    /// Unregistered because the reactor is being dropped.
    TornDown,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every step of present-fence ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FenceEvent {
    /// What happened.
    pub kind: FenceEventKind,
    /// Signal time, for `Signalled` and `Flushed`.
    pub signal_time: Option<Timestamp>,
}

/// Emitted for every resync sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResyncEvent {
    /// Hardware vsync timestamp forwarded to the tracker.
    pub timestamp: Timestamp,
    /// Whether this sample confirmed a pending period change.
    pub period_flushed: bool,
}

/// Emitted when a new period is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodChangeEvent {
    /// The newly requested period.
    pub period: Nanos,
    /// The previously requested period, if one was ever requested.
    pub previous: Option<Nanos>,
}

/// Emitted on listener lifecycle changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerEvent {
    /// Listener identity.
    pub listener: ListenerId,
    /// What happened.
    pub kind: ListenerEventKind,
    /// Dispatch token, absent for retired listeners.
    pub token: Option<CallbackToken>,
    /// Phase offset after the change.
    pub phase: Nanos,
    /// Result of cancelling the pending firing, for `Removed` and `TornDown`.
    pub cancel: Option<Result<CancelResult, DispatchError>>,
}

/// Emitted when a dispatcher firing is delivered to a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallbackEvent {
    /// Listener identity.
    pub listener: ListenerId,
    /// Dispatch token that fired.
    pub token: CallbackToken,
    /// Vsync time the dispatcher reported.
    pub vsync_time: Timestamp,
    /// Timestamp handed to the consumer (`vsync_time - period`).
    pub delivered: Timestamp,
    /// Period used for the readaptation.
    pub period: Nanos,
}

/// Emitted for every schedule request sent to the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleEvent {
    /// Listener identity.
    pub listener: ListenerId,
    /// Dispatch token.
    pub token: CallbackToken,
    /// Requested work duration (`period - phase`).
    pub work_duration: Nanos,
    /// Earliest vsync the firing may target.
    pub earliest_vsync: Timestamp,
    /// What the dispatcher answered.
    pub result: Result<(), DispatchError>,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the reactor.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for each present-fence ingestion step.
    fn on_fence(&mut self, e: &FenceEvent) {
        _ = e;
    }

    /// Called for each resync sample.
    fn on_resync(&mut self, e: &ResyncEvent) {
        _ = e;
    }

    /// Called when a new period is requested.
    fn on_period_change(&mut self, e: &PeriodChangeEvent) {
        _ = e;
    }

    /// Called on listener lifecycle changes.
    fn on_listener(&mut self, e: &ListenerEvent) {
        _ = e;
    }

    /// Called when a firing is delivered to a listener.
    fn on_callback(&mut self, e: &CallbackEvent) {
        _ = e;
    }

    /// Called after each schedule request.
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink + Send>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink + Send>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Emits a [`FenceEvent`].
    #[inline]
    pub fn fence(&mut self, e: &FenceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fence(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ResyncEvent`].
    #[inline]
    pub fn resync(&mut self, e: &ResyncEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_resync(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PeriodChangeEvent`].
    #[inline]
    pub fn period_change(&mut self, e: &PeriodChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_period_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ListenerEvent`].
    #[inline]
    pub fn listener(&mut self, e: &ListenerEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_listener(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CallbackEvent`].
    #[inline]
    pub fn callback(&mut self, e: &CallbackEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_callback(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ScheduleEvent`].
    #[inline]
    pub fn schedule(&mut self, e: &ScheduleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_schedule(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
