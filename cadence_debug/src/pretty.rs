// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! and durations are printed in microseconds.

use std::io::Write;

use cadence_core::dispatch::CancelResult;
use cadence_core::time::Timestamp;
use cadence_core::trace::{
    CallbackEvent, FenceEvent, FenceEventKind, ListenerEvent, ListenerEventKind,
    PeriodChangeEvent, ResyncEvent, ScheduleEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write + Send = Box<dyn Write + Send>> {
    writer: W,
}

impl<W: Write + Send> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the destination.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn us(t: Timestamp) -> f64 {
    t.saturating_since(Timestamp(0)).as_micros_f64()
}

fn fence_name(kind: FenceEventKind) -> &'static str {
    match kind {
        FenceEventKind::Ignored => "ignored",
        FenceEventKind::Invalid => "invalid",
        FenceEventKind::Signalled => "signalled",
        FenceEventKind::Queued => "queued",
        FenceEventKind::Flushed => "flushed",
        FenceEventKind::Evicted => "evicted",
        FenceEventKind::Dropped => "dropped",
    }
}

fn listener_name(kind: ListenerEventKind) -> &'static str {
    match kind {
        ListenerEventKind::Registered => "registered",
        ListenerEventKind::PhaseChanged => "phase",
        ListenerEventKind::Removed => "removed",
        ListenerEventKind::RetiredPhaseChange => "retired-phase",
        ListenerEventKind::TornDown => "torn-down",
    }
}

impl<W: Write + Send> TraceSink for PrettyPrintSink<W> {
    fn on_fence(&mut self, e: &FenceEvent) {
        let _ = match e.signal_time {
            Some(t) => writeln!(
                self.writer,
                "[fence] {} at {:.1}µs",
                fence_name(e.kind),
                us(t)
            ),
            None => writeln!(self.writer, "[fence] {}", fence_name(e.kind)),
        };
    }

    fn on_resync(&mut self, e: &ResyncEvent) {
        let flushed = if e.period_flushed { " period-flushed" } else { "" };
        let _ = writeln!(
            self.writer,
            "[resync] at {:.1}µs{flushed}",
            us(e.timestamp),
        );
    }

    fn on_period_change(&mut self, e: &PeriodChangeEvent) {
        let _ = match e.previous {
            Some(previous) => writeln!(
                self.writer,
                "[period] {:.1}µs -> {:.1}µs",
                previous.as_micros_f64(),
                e.period.as_micros_f64(),
            ),
            None => writeln!(
                self.writer,
                "[period] -> {:.1}µs",
                e.period.as_micros_f64()
            ),
        };
    }

    fn on_listener(&mut self, e: &ListenerEvent) {
        let cancel = match e.cancel {
            Some(Ok(CancelResult::Cancelled)) => " cancel=cancelled",
            Some(Ok(CancelResult::TooLate)) => " cancel=too-late",
            Some(Err(_)) => " cancel=ERROR",
            None => "",
        };
        let _ = writeln!(
            self.writer,
            "[listener] id={} {} phase={:.1}µs{cancel}",
            e.listener.get(),
            listener_name(e.kind),
            e.phase.as_micros_f64(),
        );
    }

    fn on_callback(&mut self, e: &CallbackEvent) {
        let _ = writeln!(
            self.writer,
            "[callback] id={} token={} vsync={:.1}µs delivered={:.1}µs",
            e.listener.get(),
            e.token.0,
            us(e.vsync_time),
            us(e.delivered),
        );
    }

    fn on_schedule(&mut self, e: &ScheduleEvent) {
        let result = match e.result {
            Ok(()) => "ok".to_owned(),
            Err(err) => format!("FAILED ({err})"),
        };
        let _ = writeln!(
            self.writer,
            "[schedule] id={} token={} work={:.1}µs earliest={:.1}µs {result}",
            e.listener.get(),
            e.token.0,
            e.work_duration.as_micros_f64(),
            us(e.earliest_vsync),
        );
    }
}
