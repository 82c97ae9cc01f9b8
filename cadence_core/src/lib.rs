// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vsync reconciliation and phase-offset callback scheduling.
//!
//! `cadence_core` sits between a display's vsync evidence and the parts of a
//! compositor that want to wake up a fixed lead time before every refresh.
//! Prediction and timer dispatch are delegated to pluggable collaborators;
//! this crate owns the reconciliation state in between.
//!
//! # Architecture
//!
//! ```text
//!   PresentFence ──┐
//!   resync sample ─┼──► VsyncReactor ──► VsyncTracker::add_vsync_timestamp
//!   set_period ────┘        │
//!                           │ register / schedule / cancel
//!                           ▼
//!                      VsyncDispatch ──(timer thread)──► trampoline
//!                                                            │
//!                       ListenerHandle callback ◄────────────┘
//!                       (vsync_time - period)
//! ```
//!
//! **[`reactor`]**: [`VsyncReactor`](reactor::VsyncReactor) handles fence
//! ingestion with a bounded pending queue, resync samples and period changes,
//! and the listener registry that keeps one dispatcher registration per
//! consumer.
//!
//! **[`fence`]**: The tri-state [`PresentFence`](fence::PresentFence)
//! query and an in-process [`SnapshotFence`](fence::SnapshotFence).
//!
//! **[`tracker`]** and **[`dispatch`]**: Collaborator contracts for vsync
//! prediction and timer-driven callback dispatch.
//!
//! **[`listener`]**: [`ListenerHandle`](listener::ListenerHandle), the
//! consumer identity.
//!
//! **[`clock`]**: The [`Clock`](clock::Clock) trait and a settable
//! [`ManualClock`](clock::ManualClock).
//!
//! **[`time`]**: Nanosecond [`Timestamp`](time::Timestamp) and
//! [`Nanos`](time::Nanos) newtypes.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! reactor instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod clock;
pub mod dispatch;
pub mod fence;
pub mod listener;
mod pending;
pub mod reactor;
pub mod time;
pub mod trace;
pub mod tracker;

pub use reactor::{ReactorConfig, ReactorError, ResyncResult, VsyncReactor};
