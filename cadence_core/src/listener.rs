// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener identity and the per-listener scheduling registry.
//!
//! Consumers identify themselves with a [`ListenerHandle`]: a process-unique
//! [`ListenerId`] paired with the callback to run. Identity is the id alone,
//! so clones of a handle are the same listener and two handles wrapping the
//! same closure are not.
//!
//! Every handle also carries a liveness marker shared by its clones. The
//! registry remembers removed identities only while some clone of the handle
//! still exists, since a dropped handle can never be presented again.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use hashbrown::HashMap;

use crate::dispatch::CallbackToken;
use crate::time::{Nanos, Timestamp};

/// Process-unique identity of a listener.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

/// Callback invoked with the timestamp of the vsync that just elapsed.
pub type ListenerCallback = Arc<dyn Fn(Timestamp) + Send + Sync>;

/// A consumer's identity plus the callback to run on each vsync event.
///
/// Cloning is cheap and preserves identity.
#[derive(Clone)]
pub struct ListenerHandle {
    id: ListenerId,
    callback: ListenerCallback,
    alive: Arc<()>,
}

impl ListenerHandle {
    /// Creates a listener with a fresh identity.
    pub fn new<F: Fn(Timestamp) + Send + Sync + 'static>(callback: F) -> Self {
        Self {
            id: ListenerId::next(),
            callback: Arc::new(callback),
            alive: Arc::new(()),
        }
    }

    /// Returns this listener's identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub(crate) fn callback(&self) -> &ListenerCallback {
        &self.callback
    }

    /// Expires once the last clone of this handle is dropped.
    pub(crate) fn liveness(&self) -> Weak<()> {
        Arc::downgrade(&self.alive)
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Scheduling state for one live listener.
pub(crate) struct ListenerEntry {
    pub(crate) name: String,
    pub(crate) token: CallbackToken,
    pub(crate) phase: Nanos,
    pub(crate) last_callback_time: Option<Timestamp>,
    pub(crate) callback: ListenerCallback,
    pub(crate) liveness: Weak<()>,
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("name", &self.name)
            .field("token", &self.token)
            .field("phase", &self.phase)
            .field("last_callback_time", &self.last_callback_time)
            .finish_non_exhaustive()
    }
}

/// Where a listener identity stands with respect to the registry.
#[derive(Debug)]
pub(crate) enum Lookup<'a> {
    /// Currently registered.
    Active(&'a mut ListenerEntry),
    /// Registered once, removed since.
    Retired,
    /// Never registered.
    Unknown,
}

/// Live listeners keyed by identity, plus the identities that were removed.
///
/// At most one entry exists per [`ListenerId`]. Removed identities are kept
/// in a retired map because a phase change on a retired listener is a
/// tolerated no-op while a phase change on an unknown one is a bug. A retired
/// identity is forgotten once every clone of its handle is gone, so the map
/// never outgrows the handles the caller still holds.
#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
    active: HashMap<ListenerId, ListenerEntry>,
    retired: HashMap<ListenerId, Weak<()>>,
}

impl ListenerRegistry {
    pub(crate) fn lookup(&mut self, id: ListenerId) -> Lookup<'_> {
        if let Some(entry) = self.active.get_mut(&id) {
            Lookup::Active(entry)
        } else if self.retired.contains_key(&id) {
            Lookup::Retired
        } else {
            Lookup::Unknown
        }
    }

    pub(crate) fn get_mut(&mut self, id: ListenerId) -> Option<&mut ListenerEntry> {
        self.active.get_mut(&id)
    }

    pub(crate) fn get(&self, id: ListenerId) -> Option<&ListenerEntry> {
        self.active.get(&id)
    }

    /// Inserts a fresh entry. The identity must not be active.
    pub(crate) fn insert(&mut self, id: ListenerId, entry: ListenerEntry) {
        self.retired.remove(&id);
        self.prune_retired();
        let prev = self.active.insert(id, entry);
        debug_assert!(prev.is_none(), "listener {id:?} inserted twice");
    }

    /// Removes the live entry for `id`, retiring the identity.
    pub(crate) fn remove(&mut self, id: ListenerId) -> Option<ListenerEntry> {
        let entry = self.active.remove(&id)?;
        self.prune_retired();
        self.retired.insert(id, entry.liveness.clone());
        Some(entry)
    }

    /// Removes every live entry, retiring their identities.
    pub(crate) fn drain_active(&mut self) -> impl Iterator<Item = (ListenerId, ListenerEntry)> {
        self.prune_retired();
        self.retired.extend(
            self.active
                .iter()
                .map(|(id, entry)| (*id, entry.liveness.clone())),
        );
        self.active.drain()
    }

    /// Forgets retired identities whose handles have all been dropped.
    fn prune_retired(&mut self) {
        self.retired.retain(|_, alive| alive.strong_count() > 0);
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }

    /// Retired identities still held by a live handle, after pruning.
    pub(crate) fn retired_len(&self) -> usize {
        self.retired
            .values()
            .filter(|alive| alive.strong_count() > 0)
            .count()
    }
}
