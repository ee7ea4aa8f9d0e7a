//! Listener registry.
//!
//! Event-name keyed publish/subscribe used by the provider for
//! `"notification"` and `"accountsChanged"`, and open to any other name a
//! page script wants to use.
//!
//! Listeners are compared by reference: registering the same [`Listener`]
//! twice under one name keeps a single entry.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{error, trace};

// ============================================================================
// Listener
// ============================================================================

/// A shared event callback.
///
/// Clones refer to the same callback and compare equal.
pub struct Listener<A = Value>(Arc<dyn Fn(&A) + Send + Sync>);

impl<A> Listener<A> {
    /// Wraps a callback.
    #[must_use]
    pub fn new(callback: impl Fn(&A) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self, args: &A) {
        (self.0)(args);
    }

    /// Returns `true` if both handles refer to the same callback.
    #[inline]
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<A> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<A> Eq for Listener<A> {}

impl<A> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

// ============================================================================
// EventEmitter
// ============================================================================

/// Registered listener plus its firing mode.
struct Entry<A> {
    listener: Listener<A>,
    once: bool,
}

impl<A> Clone for Entry<A> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
            once: self.once,
        }
    }
}

/// Event-name keyed listener registry.
///
/// Emission is synchronous and in registration order. The registry lock is
/// released before callbacks run, so listeners may subscribe or unsubscribe
/// from inside a callback; such changes take effect on the next emit.
pub struct EventEmitter<A = Value> {
    listeners: Mutex<FxHashMap<String, Vec<Entry<A>>>>,
}

impl<A> Default for EventEmitter<A> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(FxHashMap::default()),
        }
    }
}

impl<A> fmt::Debug for EventEmitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock();
        let mut map = f.debug_map();
        for (event, entries) in listeners.iter() {
            map.entry(event, &entries.len());
        }
        map.finish()
    }
}

impl<A> EventEmitter<A> {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` under `event`.
    ///
    /// No-op if the same listener is already registered under `event`.
    pub fn on(&self, event: &str, listener: Listener<A>) -> &Self {
        self.insert(event, listener, false);
        self
    }

    /// Registers `listener` to fire on the next emit of `event` only.
    ///
    /// No-op if the same listener is already registered under `event`.
    pub fn once(&self, event: &str, listener: Listener<A>) -> &Self {
        self.insert(event, listener, true);
        self
    }

    fn insert(&self, event: &str, listener: Listener<A>, once: bool) {
        let mut listeners = self.listeners.lock();
        let entries = listeners.entry(event.to_string()).or_default();
        if entries.iter().any(|entry| entry.listener.same(&listener)) {
            trace!(event, "Listener already registered");
            return;
        }
        entries.push(Entry { listener, once });
    }

    /// Removes the first registration of `listener` under `event`.
    ///
    /// Returns `true` if a listener was removed.
    pub fn remove_listener(&self, event: &str, listener: &Listener<A>) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(entries) = listeners.get_mut(event) else {
            return false;
        };

        let Some(index) = entries.iter().position(|entry| entry.listener.same(listener)) else {
            return false;
        };

        entries.remove(index);
        if entries.is_empty() {
            listeners.remove(event);
        }
        true
    }

    /// Removes every listener under `event`.
    pub fn remove_all_listeners(&self, event: &str) {
        self.listeners.lock().remove(event);
    }

    /// Removes every listener under every event.
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    /// Returns the number of listeners under `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }

    /// Returns the names of events with at least one listener.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.listeners.lock().keys().cloned().collect()
    }

    /// Invokes every listener under `event` with `args`.
    ///
    /// Returns `true` if at least one listener existed. A panicking listener
    /// is logged and skipped; the remaining listeners still run.
    pub fn emit(&self, event: &str, args: &A) -> bool {
        let snapshot = self.take_snapshot(event);
        if snapshot.is_empty() {
            return false;
        }

        trace!(event, listeners = snapshot.len(), "Emitting event");

        for entry in &snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| entry.listener.call(args)));
            if outcome.is_err() {
                error!(event, "Event listener panicked");
            }
        }

        true
    }

    /// Copies the listeners for `event`, dropping one-shot entries from the
    /// registry.
    fn take_snapshot(&self, event: &str) -> Vec<Entry<A>> {
        let mut listeners = self.listeners.lock();
        let Some(entries) = listeners.get_mut(event) else {
            return Vec::new();
        };

        let snapshot = entries.clone();
        entries.retain(|entry| !entry.once);
        if entries.is_empty() {
            listeners.remove(event);
        }
        snapshot
    }
}

// ============================================================================
// Tests
// ============================================================================
