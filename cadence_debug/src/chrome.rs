// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`ChromeTraceSink`] turns reactor events into [Chrome Trace Event
//! Format][spec] objects as they happen. The sink is moved into the reactor,
//! so export goes through a [`ChromeTrace`] handle obtained beforehand with
//! [`ChromeTraceSink::trace`].
//!
//! Events without a timestamp of their own (fence bookkeeping, listener
//! changes, schedule requests) are stamped with the sink's [`Clock`].
//! Listener-scoped events use the listener id as `tid`, so each listener gets
//! its own track.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use cadence_core::clock::Clock;
use cadence_core::time::{Nanos, Timestamp};
use cadence_core::trace::{
    CallbackEvent, FenceEvent, ListenerEvent, PeriodChangeEvent, ResyncEvent, ScheduleEvent,
    TraceSink,
};

type Events = Arc<Mutex<Vec<Value>>>;

fn lock(events: &Events) -> MutexGuard<'_, Vec<Value>> {
    events.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collects reactor events as Chrome trace event objects.
pub struct ChromeTraceSink {
    clock: Box<dyn Clock>,
    events: Events,
}

impl std::fmt::Debug for ChromeTraceSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeTraceSink")
            .field("events", &lock(&self.events).len())
            .finish_non_exhaustive()
    }
}

/// Shared view of the events collected by a [`ChromeTraceSink`].
#[derive(Clone, Debug, Default)]
pub struct ChromeTrace {
    events: Events,
}

impl ChromeTraceSink {
    /// Creates a sink that stamps untimed events with `clock`.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            events: Events::default(),
        }
    }

    /// Returns a handle for exporting the collected events.
    #[must_use]
    pub fn trace(&self) -> ChromeTrace {
        ChromeTrace {
            events: Arc::clone(&self.events),
        }
    }

    fn now_us(&self) -> f64 {
        ts_us(self.clock.now())
    }

    fn push(&self, event: Value) {
        lock(&self.events).push(event);
    }
}

impl ChromeTrace {
    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }

    /// Returns `true` if nothing has been collected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.events).is_empty()
    }

    /// Writes the collected events as a JSON array.
    ///
    /// The output is suitable for loading into `chrome://tracing` or
    /// [Perfetto](https://ui.perfetto.dev/).
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `writer`.
    pub fn export(&self, writer: &mut dyn Write) -> io::Result<()> {
        let events = lock(&self.events);
        serde_json::to_writer_pretty(writer, &*events)?;
        Ok(())
    }
}

fn ts_us(t: Timestamp) -> f64 {
    t.saturating_since(Timestamp(0)).as_micros_f64()
}

fn us(d: Nanos) -> f64 {
    d.as_micros_f64()
}

impl TraceSink for ChromeTraceSink {
    fn on_fence(&mut self, e: &FenceEvent) {
        let ts = e.signal_time.map_or_else(|| self.now_us(), ts_us);
        self.push(json!({
            "ph": "i",
            "name": format!("Fence{:?}", e.kind),
            "cat": "Fence",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "p",
        }));
    }

    fn on_resync(&mut self, e: &ResyncEvent) {
        self.push(json!({
            "ph": "i",
            "name": "Resync",
            "cat": "Period",
            "ts": ts_us(e.timestamp),
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "period_flushed": e.period_flushed,
            }
        }));
    }

    fn on_period_change(&mut self, e: &PeriodChangeEvent) {
        self.push(json!({
            "ph": "i",
            "name": "PeriodChange",
            "cat": "Period",
            "ts": self.now_us(),
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "period_us": us(e.period),
                "previous_us": e.previous.map(us),
            }
        }));
    }

    fn on_listener(&mut self, e: &ListenerEvent) {
        self.push(json!({
            "ph": "i",
            "name": format!("{:?}", e.kind),
            "cat": "Listener",
            "ts": self.now_us(),
            "pid": 0,
            "tid": e.listener.get(),
            "s": "t",
            "args": {
                "token": e.token.map(|t| t.0),
                "phase_us": us(e.phase),
                "cancel": e.cancel.map(|c| format!("{c:?}")),
            }
        }));
    }

    fn on_callback(&mut self, e: &CallbackEvent) {
        self.push(json!({
            "ph": "i",
            "name": "Callback",
            "cat": "Listener",
            "ts": ts_us(e.vsync_time),
            "pid": 0,
            "tid": e.listener.get(),
            "s": "t",
            "args": {
                "token": e.token.0,
                "delivered_us": ts_us(e.delivered),
                "period_us": us(e.period),
            }
        }));
    }

    fn on_schedule(&mut self, e: &ScheduleEvent) {
        self.push(json!({
            "ph": "i",
            "name": "Schedule",
            "cat": "Listener",
            "ts": self.now_us(),
            "pid": 0,
            "tid": e.listener.get(),
            "s": "t",
            "args": {
                "token": e.token.0,
                "work_us": us(e.work_duration),
                "earliest_vsync_us": ts_us(e.earliest_vsync),
                "error": e.result.err().map(|err| err.to_string()),
            }
        }));
    }
}
