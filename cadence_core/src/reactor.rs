// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The vsync reactor.
//!
//! [`VsyncReactor`] sits between three collaborators and the consumers that
//! want a callback once per frame:
//!
//! ```text
//!   present fences ─┐                        ┌─► VsyncTracker (evidence)
//!   resync samples ─┼─► VsyncReactor ────────┤
//!   set_period ─────┘        ▲   │           └─► VsyncDispatch (schedule)
//!                            │   ▼
//!                       listeners (phase, last delivered time)
//! ```
//!
//! Evidence (fence signal times and hardware samples) is forwarded to the
//! tracker. Listeners are registered with the dispatcher through a
//! reactor-owned trampoline that rewrites each firing into "the vsync that
//! just elapsed" and re-arms itself one frame later.
//!
//! All mutable state lives behind a single mutex. Consumer callbacks run
//! outside it, so a consumer may call back into the reactor from its
//! callback.

use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::clock::Clock;
use crate::dispatch::{CallbackToken, DispatchCallback, DispatchError, VsyncDispatch};
use crate::fence::{SharedFence, SignalTime};
use crate::listener::{ListenerEntry, ListenerHandle, ListenerId, ListenerRegistry, Lookup};
use crate::pending::{PendingFenceQueue, Resolved};
use crate::time::{Nanos, Timestamp};
use crate::trace::{
    CallbackEvent, FenceEvent, FenceEventKind, ListenerEvent, ListenerEventKind,
    PeriodChangeEvent, ResyncEvent, ScheduleEvent, TraceSink, Tracer,
};
use crate::tracker::VsyncTracker;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the [`VsyncReactor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReactorConfig {
    /// Maximum number of unsignalled present fences kept for later flushing.
    /// Zero is treated as one.
    pub pending_fence_limit: usize,
    /// Maximum number of live listeners, or `None` for no limit.
    pub max_listeners: Option<usize>,
}

impl ReactorConfig {
    /// Default for [`pending_fence_limit`](Self::pending_fence_limit).
    pub const DEFAULT_PENDING_FENCE_LIMIT: usize = 20;

    /// Default configuration: 20 pending fences, unlimited listeners.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending_fence_limit: Self::DEFAULT_PENDING_FENCE_LIMIT,
            max_listeners: None,
        }
    }
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Errors and results
// ---------------------------------------------------------------------------

/// Errors returned by listener operations on the [`VsyncReactor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactorError {
    /// The dispatcher refused the schedule request.
    Dispatch(DispatchError),
    /// Registering another listener would exceed
    /// [`ReactorConfig::max_listeners`].
    ListenerLimit {
        /// The configured limit.
        limit: usize,
    },
}

impl fmt::Display for ReactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch(_) => write!(f, "failed to schedule listener callback"),
            Self::ListenerLimit { limit } => {
                write!(f, "listener limit of {limit} reached")
            }
        }
    }
}

impl core::error::Error for ReactorError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Dispatch(e) => Some(e),
            Self::ListenerLimit { .. } => None,
        }
    }
}

impl From<DispatchError> for ReactorError {
    fn from(e: DispatchError) -> Self {
        Self::Dispatch(e)
    }
}

/// Outcome of [`VsyncReactor::add_resync_sample`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResyncResult {
    /// Whether the tracker wants more hardware samples.
    pub needs_more_samples: bool,
    /// Whether this sample confirmed a pending period change.
    pub period_flushed: bool,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// The period the reactor schedules with.
///
/// `requested` is written by `set_period` and takes effect immediately for
/// scheduling, while the tracker may still report the old period until the
/// hardware confirms the switch.
#[derive(Clone, Copy, Debug, Default)]
struct PeriodState {
    requested: Option<Nanos>,
    change_pending: bool,
}

#[derive(Debug)]
struct State {
    pending_fences: PendingFenceQueue,
    ignore_present_fences: bool,
    period: PeriodState,
    listeners: ListenerRegistry,
    tracer: Tracer,
}

struct Shared {
    clock: Box<dyn Clock>,
    dispatch: Box<dyn VsyncDispatch>,
    tracker: Box<dyn VsyncTracker>,
    max_listeners: Option<usize>,
    state: Mutex<State>,
}

impl Shared {
    /// Locks the state. Panics raised under the lock are contract violations
    /// that leave the state consistent, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn scheduling_period(&self, period: &PeriodState) -> Nanos {
        period
            .requested
            .unwrap_or_else(|| self.tracker.current_period())
    }

    fn schedule(
        &self,
        state: &mut State,
        listener: ListenerId,
        token: CallbackToken,
        work_duration: Nanos,
        earliest_vsync: Timestamp,
    ) -> Result<(), DispatchError> {
        let result = self.dispatch.schedule(token, work_duration, earliest_vsync);
        state.tracer.schedule(&ScheduleEvent {
            listener,
            token,
            work_duration,
            earliest_vsync,
            result,
        });
        result
    }

    /// Schedules the next firing for an active listener, anchored at now.
    fn schedule_from_now(
        &self,
        state: &mut State,
        listener: ListenerId,
        token: CallbackToken,
        phase: Nanos,
    ) -> Result<(), ReactorError> {
        let work_duration = self.scheduling_period(&state.period).saturating_sub(phase);
        let now = self.clock.now();
        self.schedule(state, listener, token, work_duration, now)?;
        Ok(())
    }

    /// Flushes every queued fence that has resolved since the last call.
    fn flush_resolved_fences(&self, state: &mut State) {
        let State {
            pending_fences,
            tracer,
            ..
        } = state;
        pending_fences.drain_resolved(|resolved| match resolved {
            Resolved::Signalled(t) => {
                self.tracker.add_vsync_timestamp(t);
                tracer.fence(&FenceEvent {
                    kind: FenceEventKind::Flushed,
                    signal_time: Some(t),
                });
            }
            Resolved::Dropped => tracer.fence(&FenceEvent {
                kind: FenceEventKind::Dropped,
                signal_time: None,
            }),
        });
    }

    /// Trampoline body: runs on the dispatcher's timer thread.
    fn on_vsync(&self, listener: ListenerId, vsync_time: Timestamp) {
        let (token, callback, delivered) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let period = self.scheduling_period(&state.period);
            let Some(entry) = state.listeners.get_mut(listener) else {
                return;
            };
            let delivered = vsync_time.saturating_sub(period);
            entry.last_callback_time = Some(delivered);
            let token = entry.token;
            let callback = Arc::clone(&entry.callback);
            state.tracer.callback(&CallbackEvent {
                listener,
                token,
                vsync_time,
                delivered,
                period,
            });
            (token, callback, delivered)
        };

        callback(delivered);

        let mut guard = self.lock();
        let state = &mut *guard;
        let Some(phase) = state
            .listeners
            .get(listener)
            .filter(|entry| entry.token == token)
            .map(|entry| entry.phase)
        else {
            // Removed (or removed and re-added) while the consumer ran.
            return;
        };
        let work_duration = self.scheduling_period(&state.period).saturating_sub(phase);
        // Nobody to report to on the timer thread; the trace sink sees it.
        let _ = self.schedule(state, listener, token, work_duration, vsync_time);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let State {
            listeners, tracer, ..
        } = state;
        for (listener, entry) in listeners.drain_active() {
            let cancel = self.dispatch.cancel(entry.token);
            self.dispatch.unregister_callback(entry.token);
            tracer.listener(&ListenerEvent {
                listener,
                kind: ListenerEventKind::TornDown,
                token: Some(entry.token),
                phase: entry.phase,
                cancel: Some(cancel),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// VsyncReactor
// ---------------------------------------------------------------------------

/// Reconciles vsync evidence and schedules per-listener vsync callbacks.
///
/// The reactor is `Send + Sync`; share it behind an `Arc` when several
/// threads feed it. Dropping it cancels and unregisters every listener that
/// is still active.
pub struct VsyncReactor {
    shared: Arc<Shared>,
}

impl fmt::Debug for VsyncReactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VsyncReactor")
            .field("state", &*self.shared.lock())
            .finish_non_exhaustive()
    }
}

impl VsyncReactor {
    /// Creates a reactor over the given collaborators.
    pub fn new(
        clock: impl Clock + 'static,
        dispatch: impl VsyncDispatch + 'static,
        tracker: impl VsyncTracker + 'static,
        config: ReactorConfig,
    ) -> Self {
        let state = State {
            pending_fences: PendingFenceQueue::with_limit(config.pending_fence_limit),
            ignore_present_fences: false,
            period: PeriodState::default(),
            listeners: ListenerRegistry::default(),
            tracer: Tracer::none(),
        };
        Self {
            shared: Arc::new(Shared {
                clock: Box::new(clock),
                dispatch: Box::new(dispatch),
                tracker: Box::new(tracker),
                max_listeners: config.max_listeners,
                state: Mutex::new(state),
            }),
        }
    }

    /// Installs a trace sink, replacing any previous one.
    ///
    /// Without the `trace` feature the sink is dropped immediately.
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink + Send>) {
        self.shared.lock().tracer = Tracer::new(sink);
    }

    // -- Evidence ----------------------------------------------------------

    /// Offers a present fence as vsync evidence.
    ///
    /// Returns `true` when the fence was invalid and the caller should fall
    /// back to hardware resync samples. A missing fence, or any fence while
    /// present fences are ignored, is a no-op returning `false`.
    ///
    /// Already signalled fences reach the tracker immediately. Unsignalled
    /// fences are queued and flushed, oldest first, on a later call once they
    /// signal; when the queue is full the oldest unsignalled fence is lost.
    pub fn add_present_fence(&self, fence: Option<SharedFence>) -> bool {
        let Some(fence) = fence else {
            return false;
        };

        let mut guard = self.shared.lock();
        let state = &mut *guard;
        if state.ignore_present_fences {
            state.tracer.fence(&FenceEvent {
                kind: FenceEventKind::Ignored,
                signal_time: None,
            });
            return false;
        }

        match fence.signal_time() {
            SignalTime::Invalid => {
                state.tracer.fence(&FenceEvent {
                    kind: FenceEventKind::Invalid,
                    signal_time: None,
                });
                true
            }
            SignalTime::Signalled(t) => {
                self.shared.flush_resolved_fences(state);
                self.shared.tracker.add_vsync_timestamp(t);
                state.tracer.fence(&FenceEvent {
                    kind: FenceEventKind::Signalled,
                    signal_time: Some(t),
                });
                false
            }
            SignalTime::Pending => {
                self.shared.flush_resolved_fences(state);
                if state.pending_fences.push(fence).is_some() {
                    state.tracer.fence(&FenceEvent {
                        kind: FenceEventKind::Evicted,
                        signal_time: None,
                    });
                }
                state.tracer.fence(&FenceEvent {
                    kind: FenceEventKind::Queued,
                    signal_time: None,
                });
                false
            }
        }
    }

    /// Stops (or resumes) accepting present fences.
    ///
    /// Turning the flag on discards every queued fence.
    pub fn set_ignore_present_fences(&self, ignore: bool) {
        let mut state = self.shared.lock();
        state.ignore_present_fences = ignore;
        if ignore {
            state.pending_fences.clear();
        }
    }

    /// Feeds a trusted hardware vsync timestamp to the tracker.
    ///
    /// The first sample after [`set_period`](Self::set_period) confirms the
    /// period change and reports it through
    /// [`ResyncResult::period_flushed`].
    pub fn add_resync_sample(&self, timestamp: Timestamp) -> ResyncResult {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        self.shared.tracker.add_vsync_timestamp(timestamp);
        let period_flushed = core::mem::take(&mut state.period.change_pending);
        state.tracer.resync(&ResyncEvent {
            timestamp,
            period_flushed,
        });
        ResyncResult {
            needs_more_samples: false,
            period_flushed,
        }
    }

    // -- Period ------------------------------------------------------------

    /// Requests a new display period.
    ///
    /// The tracker is told immediately and listeners pick up the new period
    /// on their next schedule. The change stays pending until the next resync
    /// sample.
    pub fn set_period(&self, period: Nanos) {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        self.shared.tracker.set_period(period);
        let previous = state.period.requested.replace(period);
        state.period.change_pending = true;
        state
            .tracer
            .period_change(&PeriodChangeEvent { period, previous });
    }

    /// Returns the tracker's current period estimate.
    #[must_use]
    pub fn period(&self) -> Nanos {
        self.shared.tracker.current_period()
    }

    /// Predicts the vsync `periods_out` periods from now.
    ///
    /// With `periods_out == 0` this is the next anticipated vsync and the
    /// period estimate is not consulted.
    #[must_use]
    pub fn compute_next_refresh(&self, periods_out: u32) -> Timestamp {
        let shared = &self.shared;
        let time_point = if periods_out == 0 {
            shared.clock.now()
        } else {
            let period = shared.tracker.current_period();
            let lead = period.saturating_mul(i64::from(periods_out));
            shared.clock.now().saturating_add(lead)
        };
        shared.tracker.next_anticipated_vsync_time_from(time_point)
    }

    /// Predicts the next vsync; same as `compute_next_refresh(0)`.
    #[must_use]
    pub fn expected_present_time(&self) -> Timestamp {
        self.compute_next_refresh(0)
    }

    // -- Listeners ---------------------------------------------------------

    /// Registers `listener` to be called `phase` before every vsync, or
    /// updates its phase if it is already registered.
    ///
    /// Either way the next firing is (re)scheduled from now with a work
    /// duration of `period - phase`, so a negative phase fires after the
    /// vsync.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorError::ListenerLimit`] if a new listener would exceed
    /// the configured limit (nothing is registered), and
    /// [`ReactorError::Dispatch`] if the dispatcher refused the schedule
    /// request (the listener stays registered).
    pub fn add_event_listener(
        &self,
        name: &str,
        phase: Nanos,
        listener: &ListenerHandle,
    ) -> Result<(), ReactorError> {
        let shared = &self.shared;
        let mut guard = shared.lock();
        let state = &mut *guard;
        let id = listener.id();

        let (token, kind) = match state.listeners.get_mut(id) {
            Some(entry) => {
                entry.phase = phase;
                (entry.token, ListenerEventKind::PhaseChanged)
            }
            None => {
                if let Some(limit) = shared.max_listeners
                    && state.listeners.len() >= limit
                {
                    return Err(ReactorError::ListenerLimit { limit });
                }
                let token = shared
                    .dispatch
                    .register_callback(self.trampoline(id), name);
                state.listeners.insert(
                    id,
                    ListenerEntry {
                        name: name.into(),
                        token,
                        phase,
                        last_callback_time: None,
                        callback: Arc::clone(listener.callback()),
                        liveness: listener.liveness(),
                    },
                );
                (token, ListenerEventKind::Registered)
            }
        };
        state.tracer.listener(&ListenerEvent {
            listener: id,
            kind,
            token: Some(token),
            phase,
            cancel: None,
        });

        shared.schedule_from_now(state, id, token, phase)
    }

    /// Unregisters `listener`, returning the last timestamp delivered to it.
    ///
    /// # Panics
    ///
    /// Panics if `listener` is not currently registered.
    pub fn remove_event_listener(&self, listener: &ListenerHandle) -> Option<Timestamp> {
        let shared = &self.shared;
        let mut guard = shared.lock();
        let id = listener.id();
        let Some(entry) = guard.listeners.remove(id) else {
            drop(guard);
            panic!("removing listener {id:?} which is not registered");
        };

        let cancel = shared.dispatch.cancel(entry.token);
        shared.dispatch.unregister_callback(entry.token);
        guard.tracer.listener(&ListenerEvent {
            listener: id,
            kind: ListenerEventKind::Removed,
            token: Some(entry.token),
            phase: entry.phase,
            cancel: Some(cancel),
        });
        entry.last_callback_time
    }

    /// Changes the phase of a registered listener and reschedules it.
    ///
    /// A listener that was registered and has since been removed is left
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorError::Dispatch`] if the dispatcher refused the
    /// schedule request.
    ///
    /// # Panics
    ///
    /// Panics if `listener` was never registered.
    pub fn change_phase_offset(
        &self,
        listener: &ListenerHandle,
        phase: Nanos,
    ) -> Result<(), ReactorError> {
        let shared = &self.shared;
        let mut guard = shared.lock();
        let state = &mut *guard;
        let id = listener.id();

        let token = match state.listeners.lookup(id) {
            Lookup::Active(entry) => {
                entry.phase = phase;
                entry.token
            }
            Lookup::Retired => {
                state.tracer.listener(&ListenerEvent {
                    listener: id,
                    kind: ListenerEventKind::RetiredPhaseChange,
                    token: None,
                    phase,
                    cancel: None,
                });
                return Ok(());
            }
            Lookup::Unknown => {
                panic!("changing phase of listener {id:?} which was never registered")
            }
        };
        state.tracer.listener(&ListenerEvent {
            listener: id,
            kind: ListenerEventKind::PhaseChanged,
            token: Some(token),
            phase,
            cancel: None,
        });

        shared.schedule_from_now(state, id, token, phase)
    }

    // -- Introspection -----------------------------------------------------

    /// Returns the last timestamp delivered to `listener`, if it is
    /// registered and has fired at least once.
    #[must_use]
    pub fn last_callback_time(&self, listener: &ListenerHandle) -> Option<Timestamp> {
        self.shared
            .lock()
            .listeners
            .get(listener.id())
            .and_then(|entry| entry.last_callback_time)
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.lock().listeners.len()
    }

    /// Returns the number of removed listeners whose handles are still alive.
    ///
    /// Only these can be passed to
    /// [`change_phase_offset`](Self::change_phase_offset) again, so identities
    /// of dropped handles are forgotten.
    #[must_use]
    pub fn retired_listener_count(&self) -> usize {
        self.shared.lock().listeners.retired_len()
    }

    /// Returns the number of unsignalled fences currently queued.
    #[must_use]
    pub fn pending_fence_count(&self) -> usize {
        self.shared.lock().pending_fences.len()
    }

    /// Returns the effective pending-fence limit.
    #[must_use]
    pub fn pending_fence_limit(&self) -> usize {
        self.shared.lock().pending_fences.limit()
    }

    /// Returns how many unsignalled fences were pushed out of a full queue.
    #[must_use]
    pub fn evicted_fence_count(&self) -> u64 {
        self.shared.lock().pending_fences.evicted_count()
    }

    fn trampoline(&self, listener: ListenerId) -> DispatchCallback {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        Arc::new(move |vsync_time: Timestamp| {
            if let Some(shared) = shared.upgrade() {
                shared.on_vsync(listener, vsync_time);
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::clock::ManualClock;
    use crate::dispatch::CancelResult;
    use crate::fence::SnapshotFence;

    const PENDING_LIMIT: usize = 3;
    const DUMMY_TIME: Timestamp = Timestamp(47);
    const PHASE: Nanos = Nanos(3000);
    const ANOTHER_PHASE: Nanos = Nanos(5200);
    const PERIOD: Nanos = Nanos(10_000);
    const ANOTHER_PERIOD: Nanos = Nanos(23_333);
    const FAKE_NOW: Timestamp = Timestamp(2214);
    const FAKE_CB_TIME: Timestamp = Timestamp(2093);
    const FAKE_TOKEN: CallbackToken = CallbackToken(2398);
    const NAME: &str = "callbacky";

    // -- Collaborator doubles ------------------------------------------------

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum DispatchCall {
        Register(String),
        Unregister(CallbackToken),
        Schedule(CallbackToken, Nanos, Timestamp),
        Cancel(CallbackToken),
    }

    struct MockDispatch {
        calls: Mutex<Vec<DispatchCall>>,
        callbacks: Mutex<Vec<(CallbackToken, DispatchCallback)>>,
        next_token: Mutex<u64>,
        schedule_result: Mutex<Result<(), DispatchError>>,
    }

    impl Default for MockDispatch {
        fn default() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                callbacks: Mutex::new(Vec::new()),
                next_token: Mutex::new(FAKE_TOKEN.0),
                schedule_result: Mutex::new(Ok(())),
            }
        }
    }

    impl MockDispatch {
        fn calls(&self) -> Vec<DispatchCall> {
            self.calls.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.calls.lock().unwrap().clear();
        }

        fn fail_schedules(&self, error: DispatchError) {
            *self.schedule_result.lock().unwrap() = Err(error);
        }

        /// Fires the most recently registered callback for `token`.
        fn fire(&self, token: CallbackToken, vsync_time: Timestamp) {
            let callback = self
                .callbacks
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(t, _)| *t == token)
                .map(|(_, cb)| Arc::clone(cb))
                .expect("token was registered");
            callback(vsync_time);
        }
    }

    impl VsyncDispatch for MockDispatch {
        fn register_callback(&self, callback: DispatchCallback, name: &str) -> CallbackToken {
            let mut next = self.next_token.lock().unwrap();
            let token = CallbackToken(*next);
            *next += 1;
            self.calls
                .lock()
                .unwrap()
                .push(DispatchCall::Register(name.to_owned()));
            self.callbacks.lock().unwrap().push((token, callback));
            token
        }

        fn unregister_callback(&self, token: CallbackToken) {
            self.calls
                .lock()
                .unwrap()
                .push(DispatchCall::Unregister(token));
        }

        fn schedule(
            &self,
            token: CallbackToken,
            work_duration: Nanos,
            earliest_vsync: Timestamp,
        ) -> Result<(), DispatchError> {
            self.calls.lock().unwrap().push(DispatchCall::Schedule(
                token,
                work_duration,
                earliest_vsync,
            ));
            *self.schedule_result.lock().unwrap()
        }

        fn cancel(&self, token: CallbackToken) -> Result<CancelResult, DispatchError> {
            self.calls.lock().unwrap().push(DispatchCall::Cancel(token));
            Ok(CancelResult::Cancelled)
        }
    }

    #[derive(Default)]
    struct MockTracker {
        period: Mutex<Nanos>,
        next_vsync: Mutex<Timestamp>,
        timestamps: Mutex<Vec<Timestamp>>,
        queries: Mutex<Vec<Timestamp>>,
        set_periods: Mutex<Vec<Nanos>>,
        period_queries: AtomicUsize,
    }

    impl MockTracker {
        fn with_period(period: Nanos) -> Self {
            let tracker = Self::default();
            *tracker.period.lock().unwrap() = period;
            tracker
        }

        fn timestamps(&self) -> Vec<Timestamp> {
            self.timestamps.lock().unwrap().clone()
        }
    }

    impl VsyncTracker for MockTracker {
        fn add_vsync_timestamp(&self, timestamp: Timestamp) {
            self.timestamps.lock().unwrap().push(timestamp);
        }

        fn next_anticipated_vsync_time_from(&self, time_point: Timestamp) -> Timestamp {
            self.queries.lock().unwrap().push(time_point);
            *self.next_vsync.lock().unwrap()
        }

        fn current_period(&self) -> Nanos {
            self.period_queries.fetch_add(1, Ordering::Relaxed);
            *self.period.lock().unwrap()
        }

        fn set_period(&self, period: Nanos) {
            self.set_periods.lock().unwrap().push(period);
        }
    }

    struct Fixture {
        clock: Arc<ManualClock>,
        dispatch: Arc<MockDispatch>,
        tracker: Arc<MockTracker>,
        reactor: VsyncReactor,
    }

    fn fixture_with(config: ReactorConfig) -> Fixture {
        let clock = Arc::new(ManualClock::new(FAKE_NOW));
        let dispatch = Arc::new(MockDispatch::default());
        let tracker = Arc::new(MockTracker::with_period(PERIOD));
        let reactor = VsyncReactor::new(
            Arc::clone(&clock),
            Arc::clone(&dispatch),
            Arc::clone(&tracker),
            config,
        );
        Fixture {
            clock,
            dispatch,
            tracker,
            reactor,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(ReactorConfig {
            pending_fence_limit: PENDING_LIMIT,
            ..ReactorConfig::new()
        })
    }

    fn signalled(t: Timestamp) -> Option<SharedFence> {
        Some(Arc::new(SnapshotFence::signalled(t)))
    }

    /// A listener that records every timestamp it receives.
    fn recording_listener() -> (ListenerHandle, Arc<Mutex<Vec<Timestamp>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let handle = ListenerHandle::new(move |t| sink.lock().unwrap().push(t));
        (handle, received)
    }

    // -- Config and errors ---------------------------------------------------

    #[test]
    fn default_config() {
        let config = ReactorConfig::default();
        assert_eq!(config.pending_fence_limit, 20);
        assert_eq!(config.max_listeners, None);
    }

    #[test]
    fn zero_fence_limit_is_promoted() {
        let f = fixture_with(ReactorConfig {
            pending_fence_limit: 0,
            ..ReactorConfig::new()
        });
        assert_eq!(f.reactor.pending_fence_limit(), 1);
    }

    #[test]
    fn reactor_error_display_and_source() {
        use core::error::Error;

        let e = ReactorError::from(DispatchError::CannotSchedule);
        assert_eq!(e.to_string(), "failed to schedule listener callback");
        assert!(e.source().is_some());

        let e = ReactorError::ListenerLimit { limit: 3 };
        assert_eq!(e.to_string(), "listener limit of 3 reached");
        assert!(e.source().is_none());
    }

    // -- Fences --------------------------------------------------------------

    #[test]
    fn adding_no_fence_is_a_no_op() {
        let f = fixture();
        assert!(!f.reactor.add_present_fence(None));
        assert!(f.tracker.timestamps().is_empty());
    }

    #[test]
    fn adding_invalid_fence_signals_need_for_more_info() {
        let f = fixture();
        assert!(f.reactor.add_present_fence(Some(Arc::new(SnapshotFence::invalid()))));
        assert!(f.tracker.timestamps().is_empty());
        assert_eq!(f.reactor.pending_fence_count(), 0, "invalid fences are not queued");
    }

    #[test]
    fn invalid_fence_leaves_queue_untouched() {
        let f = fixture();
        let queued = Arc::new(SnapshotFence::pending());
        f.reactor.add_present_fence(Some(queued.clone()));
        queued.signal(DUMMY_TIME);

        assert!(f.reactor.add_present_fence(Some(Arc::new(SnapshotFence::invalid()))));
        assert!(
            f.tracker.timestamps().is_empty(),
            "an invalid fence does not flush the queue"
        );
        assert_eq!(f.reactor.pending_fence_count(), 1);

        f.reactor.add_present_fence(signalled(Timestamp(DUMMY_TIME.0 + 1)));
        assert_eq!(
            f.tracker.timestamps(),
            [DUMMY_TIME, Timestamp(DUMMY_TIME.0 + 1)]
        );
    }

    #[test]
    fn adding_signalled_fence_adds_to_tracker() {
        let f = fixture();
        assert!(!f.reactor.add_present_fence(signalled(DUMMY_TIME)));
        assert_eq!(f.tracker.timestamps(), [DUMMY_TIME]);
    }

    #[test]
    fn adding_pending_fence_adds_signalled() {
        let f = fixture();
        let pending = Arc::new(SnapshotFence::pending());
        assert!(!f.reactor.add_present_fence(Some(pending.clone())));
        assert!(f.tracker.timestamps().is_empty());
        assert_eq!(f.reactor.pending_fence_count(), 1);

        pending.signal(Timestamp(DUMMY_TIME.0 - 1));
        assert!(!f.reactor.add_present_fence(signalled(DUMMY_TIME)));
        assert_eq!(
            f.tracker.timestamps(),
            [Timestamp(DUMMY_TIME.0 - 1), DUMMY_TIME],
            "queued fence is flushed before the new one"
        );
        assert_eq!(f.reactor.pending_fence_count(), 0);
    }

    #[test]
    fn queued_fences_flush_in_queue_order() {
        let f = fixture();
        let a = Arc::new(SnapshotFence::pending());
        let b = Arc::new(SnapshotFence::pending());
        f.reactor.add_present_fence(Some(a.clone()));
        f.reactor.add_present_fence(Some(b.clone()));

        b.signal(Timestamp(200));
        a.signal(Timestamp(100));
        f.reactor.add_present_fence(signalled(Timestamp(300)));
        assert_eq!(
            f.tracker.timestamps(),
            [Timestamp(100), Timestamp(200), Timestamp(300)]
        );
    }

    #[test]
    fn queued_fence_that_turns_invalid_is_dropped() {
        let f = fixture();
        let fence = Arc::new(SnapshotFence::pending());
        f.reactor.add_present_fence(Some(fence.clone()));

        fence.invalidate();
        assert!(!f.reactor.add_present_fence(signalled(DUMMY_TIME)));
        assert_eq!(f.tracker.timestamps(), [DUMMY_TIME]);
        assert_eq!(f.reactor.pending_fence_count(), 0);
    }

    #[test]
    fn limits_pending_fences() {
        let f = fixture();
        let fences: Vec<_> = (0..=PENDING_LIMIT)
            .map(|_| Arc::new(SnapshotFence::pending()))
            .collect();
        for fence in &fences {
            f.reactor.add_present_fence(Some(Arc::clone(fence) as SharedFence));
        }
        assert_eq!(f.reactor.pending_fence_count(), PENDING_LIMIT);
        assert_eq!(f.reactor.evicted_fence_count(), 1);

        for (fence, t) in fences.iter().zip([10, 20, 30, 40]) {
            fence.signal(Timestamp(t));
        }
        f.reactor.add_present_fence(signalled(DUMMY_TIME));
        assert_eq!(
            f.tracker.timestamps(),
            [Timestamp(20), Timestamp(30), Timestamp(40), DUMMY_TIME],
            "the evicted oldest fence never reaches the tracker"
        );
    }

    #[test]
    fn ignores_present_fences_when_told_to() {
        let f = fixture();
        f.reactor.add_present_fence(Some(Arc::new(SnapshotFence::pending())));
        assert_eq!(f.reactor.pending_fence_count(), 1);

        f.reactor.set_ignore_present_fences(true);
        assert_eq!(f.reactor.pending_fence_count(), 0, "enabling clears the queue");
        assert!(!f.reactor.add_present_fence(signalled(DUMMY_TIME)));
        assert!(!f.reactor.add_present_fence(Some(Arc::new(SnapshotFence::invalid()))));
        assert!(f.tracker.timestamps().is_empty());

        f.reactor.set_ignore_present_fences(false);
        f.reactor.add_present_fence(signalled(DUMMY_TIME));
        assert_eq!(f.tracker.timestamps(), [DUMMY_TIME]);
    }

    // -- Queries -------------------------------------------------------------

    #[test]
    fn queries_tracker_for_next_refresh_now() {
        let f = fixture();
        *f.tracker.next_vsync.lock().unwrap() = Timestamp(4000);
        assert_eq!(f.reactor.compute_next_refresh(0), Timestamp(4000));
        assert_eq!(*f.tracker.queries.lock().unwrap(), [FAKE_NOW]);
        assert_eq!(f.tracker.period_queries.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn queries_tracker_for_expected_present_time() {
        let f = fixture();
        *f.tracker.next_vsync.lock().unwrap() = Timestamp(4000);
        assert_eq!(f.reactor.expected_present_time(), Timestamp(4000));
        assert_eq!(*f.tracker.queries.lock().unwrap(), [FAKE_NOW]);
        assert_eq!(f.tracker.period_queries.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn queries_tracker_for_next_refresh_future() {
        let f = fixture();
        let fake_future = Timestamp(4023);
        *f.tracker.next_vsync.lock().unwrap() = fake_future;
        let periods_out = 3;
        assert_eq!(f.reactor.compute_next_refresh(periods_out), fake_future);
        assert_eq!(
            *f.tracker.queries.lock().unwrap(),
            [Timestamp(FAKE_NOW.0 + 3 * PERIOD.0)]
        );
        assert_eq!(f.tracker.period_queries.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn gets_period_from_tracker() {
        let f = fixture();
        assert_eq!(f.reactor.period(), PERIOD);
    }

    // -- Period and resync ---------------------------------------------------

    #[test]
    fn set_period_forwards_to_tracker() {
        let f = fixture();
        f.reactor.set_period(ANOTHER_PERIOD);
        assert_eq!(*f.tracker.set_periods.lock().unwrap(), [ANOTHER_PERIOD]);
    }

    #[test]
    fn resync_sample_reaches_tracker() {
        let f = fixture();
        let result = f.reactor.add_resync_sample(DUMMY_TIME);
        assert_eq!(
            result,
            ResyncResult {
                needs_more_samples: false,
                period_flushed: false,
            }
        );
        assert_eq!(f.tracker.timestamps(), [DUMMY_TIME]);
    }

    #[test]
    fn period_change_is_flushed_by_next_sample_only() {
        let f = fixture();
        f.reactor.set_period(ANOTHER_PERIOD);
        assert!(f.reactor.add_resync_sample(Timestamp(100)).period_flushed);
        assert!(!f.reactor.add_resync_sample(Timestamp(200)).period_flushed);
        assert_eq!(f.tracker.timestamps(), [Timestamp(100), Timestamp(200)]);
    }

    // -- Listeners -----------------------------------------------------------

    #[test]
    fn adding_listener_registers_and_schedules() {
        let f = fixture();
        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        assert_eq!(
            f.dispatch.calls(),
            [
                DispatchCall::Register(NAME.into()),
                DispatchCall::Schedule(FAKE_TOKEN, PERIOD - PHASE, FAKE_NOW),
            ]
        );
        assert_eq!(f.reactor.listener_count(), 1);
    }

    #[test]
    fn removing_listener_cancels_and_unregisters() {
        let f = fixture();
        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        f.dispatch.clear();

        assert_eq!(f.reactor.remove_event_listener(&listener), None);
        assert_eq!(
            f.dispatch.calls(),
            [
                DispatchCall::Cancel(FAKE_TOKEN),
                DispatchCall::Unregister(FAKE_TOKEN),
            ]
        );
        assert_eq!(f.reactor.listener_count(), 0);
    }

    #[test]
    fn adding_twice_changes_phase() {
        let f = fixture();
        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        f.reactor
            .add_event_listener(NAME, ANOTHER_PHASE, &listener)
            .unwrap();
        assert_eq!(
            f.dispatch.calls(),
            [
                DispatchCall::Register(NAME.into()),
                DispatchCall::Schedule(FAKE_TOKEN, Nanos(7000), FAKE_NOW),
                DispatchCall::Schedule(FAKE_TOKEN, Nanos(4800), FAKE_NOW),
            ],
            "no second registration"
        );
    }

    #[test]
    fn listener_gets_readapted_callback_and_is_rescheduled() {
        let f = fixture();
        let (listener, received) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        f.dispatch.clear();

        f.dispatch.fire(FAKE_TOKEN, FAKE_CB_TIME);
        let delivered = FAKE_CB_TIME - PERIOD;
        assert_eq!(*received.lock().unwrap(), [delivered]);
        assert_eq!(
            f.dispatch.calls(),
            [DispatchCall::Schedule(FAKE_TOKEN, PERIOD - PHASE, FAKE_CB_TIME)]
        );
        assert_eq!(f.reactor.last_callback_time(&listener), Some(delivered));
        assert_eq!(f.reactor.remove_event_listener(&listener), Some(delivered));
    }

    #[test]
    fn changing_period_changes_workload() {
        let f = fixture();
        let (listener, received) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        f.reactor.set_period(ANOTHER_PERIOD);
        f.dispatch.clear();

        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        assert_eq!(
            f.dispatch.calls(),
            [DispatchCall::Schedule(FAKE_TOKEN, ANOTHER_PERIOD - PHASE, FAKE_NOW)]
        );

        f.dispatch.fire(FAKE_TOKEN, FAKE_CB_TIME);
        assert_eq!(*received.lock().unwrap(), [FAKE_CB_TIME - ANOTHER_PERIOD]);
    }

    #[test]
    fn negative_phase_increases_workload() {
        let f = fixture();
        let negative = Nanos(-4000);
        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, negative, &listener).unwrap();
        assert_eq!(
            f.dispatch.calls(),
            [
                DispatchCall::Register(NAME.into()),
                DispatchCall::Schedule(FAKE_TOKEN, Nanos(14_000), FAKE_NOW),
            ]
        );
        f.dispatch.clear();

        f.dispatch.fire(FAKE_TOKEN, FAKE_CB_TIME);
        assert_eq!(
            f.dispatch.calls(),
            [DispatchCall::Schedule(FAKE_TOKEN, Nanos(14_000), FAKE_CB_TIME)]
        );
    }

    #[test]
    fn change_phase_offset_reschedules_from_now() {
        let f = fixture();
        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        f.dispatch.clear();
        f.clock.set(Timestamp(5000));

        f.reactor.change_phase_offset(&listener, ANOTHER_PHASE).unwrap();
        assert_eq!(
            f.dispatch.calls(),
            [DispatchCall::Schedule(FAKE_TOKEN, Nanos(4800), Timestamp(5000))]
        );
    }

    #[test]
    fn change_phase_offset_after_removal_is_tolerated() {
        let f = fixture();
        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        let _ = f.reactor.remove_event_listener(&listener);
        f.dispatch.clear();

        f.reactor.change_phase_offset(&listener, ANOTHER_PHASE).unwrap();
        assert!(f.dispatch.calls().is_empty(), "no dispatcher traffic");
    }

    #[test]
    #[should_panic(expected = "which is not registered")]
    fn removing_unknown_listener_panics() {
        let f = fixture();
        let (listener, _) = recording_listener();
        let _ = f.reactor.remove_event_listener(&listener);
    }

    #[test]
    #[should_panic(expected = "which is not registered")]
    fn removing_twice_panics() {
        let f = fixture();
        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        let _ = f.reactor.remove_event_listener(&listener);
        let _ = f.reactor.remove_event_listener(&listener);
    }

    #[test]
    #[should_panic(expected = "which was never registered")]
    fn change_phase_offset_on_unknown_listener_panics() {
        let f = fixture();
        let (listener, _) = recording_listener();
        let _ = f.reactor.change_phase_offset(&listener, PHASE);
    }

    #[test]
    fn readding_after_removal_registers_again() {
        let f = fixture();
        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        let _ = f.reactor.remove_event_listener(&listener);
        f.dispatch.clear();

        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        let next = CallbackToken(FAKE_TOKEN.0 + 1);
        assert_eq!(
            f.dispatch.calls(),
            [
                DispatchCall::Register(NAME.into()),
                DispatchCall::Schedule(next, PERIOD - PHASE, FAKE_NOW),
            ]
        );
    }

    #[test]
    fn schedule_failure_is_returned() {
        let f = fixture();
        f.dispatch.fail_schedules(DispatchError::CannotSchedule);
        let (listener, _) = recording_listener();
        assert_eq!(
            f.reactor.add_event_listener(NAME, PHASE, &listener),
            Err(ReactorError::Dispatch(DispatchError::CannotSchedule))
        );
        assert_eq!(f.reactor.listener_count(), 1, "listener stays registered");
        assert_eq!(
            f.reactor.change_phase_offset(&listener, ANOTHER_PHASE),
            Err(ReactorError::Dispatch(DispatchError::CannotSchedule))
        );
    }

    #[test]
    fn listener_limit_is_enforced() {
        let f = fixture_with(ReactorConfig {
            max_listeners: Some(2),
            ..ReactorConfig::new()
        });
        let listeners: Vec<_> = (0..3).map(|_| recording_listener().0).collect();
        f.reactor.add_event_listener(NAME, PHASE, &listeners[0]).unwrap();
        f.reactor.add_event_listener(NAME, PHASE, &listeners[1]).unwrap();
        f.dispatch.clear();

        assert_eq!(
            f.reactor.add_event_listener(NAME, PHASE, &listeners[2]),
            Err(ReactorError::ListenerLimit { limit: 2 })
        );
        assert!(f.dispatch.calls().is_empty(), "nothing registered");

        // Re-adding an existing listener is a phase change, not a new entry.
        f.reactor
            .add_event_listener(NAME, ANOTHER_PHASE, &listeners[0])
            .unwrap();
    }

    #[test]
    fn listener_may_remove_itself_from_its_callback() {
        let f = fixture();
        let reactor = Arc::new(f.reactor);
        let slot: Arc<Mutex<Option<ListenerHandle>>> = Arc::new(Mutex::new(None));
        let listener = {
            let reactor = Arc::downgrade(&reactor);
            let slot = Arc::clone(&slot);
            ListenerHandle::new(move |_| {
                let handle = slot.lock().unwrap().take();
                if let (Some(reactor), Some(handle)) = (reactor.upgrade(), handle) {
                    let _ = reactor.remove_event_listener(&handle);
                }
            })
        };
        *slot.lock().unwrap() = Some(listener.clone());
        reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        f.dispatch.clear();

        f.dispatch.fire(FAKE_TOKEN, FAKE_CB_TIME);
        assert_eq!(
            f.dispatch.calls(),
            [
                DispatchCall::Cancel(FAKE_TOKEN),
                DispatchCall::Unregister(FAKE_TOKEN),
            ],
            "no reschedule after self-removal"
        );
        assert_eq!(reactor.listener_count(), 0);
    }

    #[test]
    fn listeners_removed_on_drop() {
        let f = fixture();
        let (first, _) = recording_listener();
        let (second, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &first).unwrap();
        f.reactor
            .add_event_listener(NAME, ANOTHER_PHASE, &second)
            .unwrap();
        f.dispatch.clear();

        drop(f.reactor);
        let calls = f.dispatch.calls();
        assert_eq!(calls.len(), 4, "got {calls:?}");
        // Teardown order across listeners is unspecified; each token is
        // cancelled and then unregistered.
        for token in [FAKE_TOKEN, CallbackToken(FAKE_TOKEN.0 + 1)] {
            let cancel = calls.iter().position(|c| *c == DispatchCall::Cancel(token));
            let unregister = calls
                .iter()
                .position(|c| *c == DispatchCall::Unregister(token));
            match (cancel, unregister) {
                (Some(c), Some(u)) => assert_eq!(u, c + 1, "{token:?}: got {calls:?}"),
                _ => panic!("{token:?} was not torn down: {calls:?}"),
            }
        }
    }

    #[test]
    fn churning_dropped_listeners_keeps_reactor_bounded() {
        let f = fixture();
        for _ in 0..1_000 {
            let (listener, _) = recording_listener();
            f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
            let _ = f.reactor.remove_event_listener(&listener);
        }
        assert_eq!(f.reactor.listener_count(), 0);
        assert_eq!(
            f.reactor.retired_listener_count(),
            0,
            "retired identities of dropped handles are forgotten"
        );
    }

    #[test]
    fn firing_after_drop_is_ignored() {
        let f = fixture();
        let (listener, received) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        drop(f.reactor);
        f.dispatch.clear();

        f.dispatch.fire(FAKE_TOKEN, FAKE_CB_TIME);
        assert!(received.lock().unwrap().is_empty());
        assert!(f.dispatch.calls().is_empty());
    }

    #[test]
    fn concurrent_evidence_and_firings() {
        let f = fixture();
        let (listener, received) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();

        std::thread::scope(|s| {
            s.spawn(|| {
                for t in 0..100 {
                    f.reactor.add_present_fence(signalled(Timestamp(t)));
                }
            });
            s.spawn(|| {
                for t in 0..100 {
                    let _ = f.reactor.add_resync_sample(Timestamp(1000 + t));
                }
            });
            s.spawn(|| {
                for t in 0..100 {
                    f.dispatch.fire(FAKE_TOKEN, Timestamp(20_000 + t));
                }
            });
        });

        assert_eq!(f.tracker.timestamps().len(), 200);
        assert_eq!(received.lock().unwrap().len(), 100);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn trace_sink_sees_reactor_events() {
        #[derive(Default)]
        struct Recorder {
            fences: Arc<Mutex<Vec<FenceEventKind>>>,
            listeners: Arc<Mutex<Vec<ListenerEventKind>>>,
            callbacks: Arc<Mutex<Vec<CallbackEvent>>>,
            resyncs: Arc<Mutex<Vec<ResyncEvent>>>,
        }
        impl TraceSink for Recorder {
            fn on_fence(&mut self, e: &FenceEvent) {
                self.fences.lock().unwrap().push(e.kind);
            }
            fn on_listener(&mut self, e: &ListenerEvent) {
                self.listeners.lock().unwrap().push(e.kind);
            }
            fn on_callback(&mut self, e: &CallbackEvent) {
                self.callbacks.lock().unwrap().push(*e);
            }
            fn on_resync(&mut self, e: &ResyncEvent) {
                self.resyncs.lock().unwrap().push(*e);
            }
        }

        let f = fixture_with(ReactorConfig {
            pending_fence_limit: 1,
            ..ReactorConfig::new()
        });
        let recorder = Recorder::default();
        let fences = Arc::clone(&recorder.fences);
        let listeners = Arc::clone(&recorder.listeners);
        let callbacks = Arc::clone(&recorder.callbacks);
        let resyncs = Arc::clone(&recorder.resyncs);
        f.reactor.set_trace_sink(Box::new(recorder));

        let first = Arc::new(SnapshotFence::pending());
        f.reactor.add_present_fence(Some(first.clone()));
        f.reactor.add_present_fence(Some(Arc::new(SnapshotFence::pending())));
        f.reactor.add_present_fence(Some(Arc::new(SnapshotFence::invalid())));
        assert_eq!(
            *fences.lock().unwrap(),
            [
                FenceEventKind::Queued,
                FenceEventKind::Evicted,
                FenceEventKind::Queued,
                FenceEventKind::Invalid,
            ]
        );

        f.reactor.set_period(ANOTHER_PERIOD);
        let _ = f.reactor.add_resync_sample(DUMMY_TIME);
        assert_eq!(
            *resyncs.lock().unwrap(),
            [ResyncEvent {
                timestamp: DUMMY_TIME,
                period_flushed: true,
            }]
        );

        let (listener, _) = recording_listener();
        f.reactor.add_event_listener(NAME, PHASE, &listener).unwrap();
        f.dispatch.fire(FAKE_TOKEN, FAKE_CB_TIME);
        let _ = f.reactor.remove_event_listener(&listener);
        f.reactor.change_phase_offset(&listener, PHASE).unwrap();
        assert_eq!(
            *listeners.lock().unwrap(),
            [
                ListenerEventKind::Registered,
                ListenerEventKind::Removed,
                ListenerEventKind::RetiredPhaseChange,
            ]
        );
        assert_eq!(
            *callbacks.lock().unwrap(),
            [CallbackEvent {
                listener: listener.id(),
                token: FAKE_TOKEN,
                vsync_time: FAKE_CB_TIME,
                delivered: FAKE_CB_TIME - ANOTHER_PERIOD,
                period: ANOTHER_PERIOD,
            }]
        );
    }
}
