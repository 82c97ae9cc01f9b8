// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! POSIX backend for cadence.
//!
//! Provides the host clock the reactor schedules against:
//!
//! - [`PosixClock`], a [`Clock`](cadence_core::clock::Clock) over
//!   `clock_gettime`
//! - [`now`], a free read of `CLOCK_MONOTONIC`

mod time;

pub use time::{PosixClock, now};
