//! Listener registry and notification dispatch.
//!
//! This module provides `ListenerSet`, which holds downstream listeners weakly so a
//! producer never keeps its dependents alive, and routes changes to the ones still
//! alive. Failures raised by a listener are logged and swallowed here; they never
//! reach the producer.

use crate::change_set::Change;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Unique identifier for a producer or listener.
pub type NodeId = u64;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Gets the next unique node ID.
pub fn next_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Failure reported by a listener while handling a change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// The listener does not propagate changes.
    #[error("listener does not handle updates")]
    Unsupported,
    /// The listener refused the change.
    #[error("listener rejected change: {message}")]
    Rejected { message: String },
}

/// Something that reacts to changes of a producer it subscribed to.
pub trait Listener {
    /// Identity used for de-duplication and unsubscription.
    fn listener_id(&self) -> NodeId;

    /// Handles a change.
    ///
    /// The default implementation reports `Unsupported`, which the dispatcher
    /// treats as "skip silently".
    fn update(&self, change: &Change) -> Result<(), NotifyError> {
        let _ = change;
        Err(NotifyError::Unsupported)
    }
}

/// Weakly-held set of listeners.
///
/// # Example
///
/// ```ignore
/// let mut listeners = ListenerSet::new();
/// listeners.subscribe(&node);
///
/// let live = listeners.live();
/// ListenerSet::dispatch(&live, &Change::appended(producer_id, 1));
/// ```
#[derive(Default)]
pub struct ListenerSet {
    entries: Vec<(NodeId, Weak<dyn Listener>)>,
}

impl ListenerSet {
    /// Creates an empty listener set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Subscribes a listener without taking ownership of it.
    ///
    /// Subscribing the same listener twice is a no-op.
    pub fn subscribe<L>(&mut self, listener: &Rc<L>)
    where
        L: Listener + 'static,
    {
        let weak: Weak<dyn Listener> = Rc::downgrade(listener) as Weak<L>;
        self.subscribe_weak(listener.listener_id(), weak);
    }

    /// Subscribes an already-downgraded listener.
    pub fn subscribe_weak(&mut self, id: NodeId, listener: Weak<dyn Listener>) {
        self.cleanup();
        if self.entries.iter().any(|(existing, _)| *existing == id) {
            return;
        }
        self.entries.push((id, listener));
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the listener was found and removed.
    pub fn unsubscribe(&mut self, id: NodeId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    /// Returns true if a listener with this ID is subscribed and alive.
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries
            .iter()
            .any(|(existing, w)| *existing == id && w.strong_count() > 0)
    }

    /// Upgrades every live listener, dropping the dead ones.
    pub fn live(&mut self) -> Vec<Rc<dyn Listener>> {
        self.cleanup();
        self.entries.iter().filter_map(|(_, w)| w.upgrade()).collect()
    }

    /// Pushes a change to each listener, swallowing failures.
    ///
    /// Takes an upgraded snapshot so that the owner of the set can release any
    /// borrow on itself before listeners run.
    pub fn dispatch(listeners: &[Rc<dyn Listener>], change: &Change) {
        for listener in listeners {
            match listener.update(change) {
                Ok(()) | Err(NotifyError::Unsupported) => {}
                Err(err) => {
                    tracing::debug!(
                        listener = listener.listener_id(),
                        origin = change.origin,
                        error = %err,
                        "listener failed during notification"
                    );
                }
            }
        }
    }

    /// Returns the number of live listeners.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .count()
    }

    /// Returns true if there are no live listeners.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cleans up stale weak references.
    pub fn cleanup(&mut self) {
        self.entries.retain(|(_, w)| w.strong_count() > 0);
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
