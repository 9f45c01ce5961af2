//! Callback listeners for external observers.
//!
//! An `Observer` lets code outside the graph (a renderer, a log sink, a test) watch a
//! producer through the same weak subscription contract used between nodes. The
//! producer never owns it: drop the `Rc` and the observer silently disappears.

use crate::change_set::Change;
use crate::notify::{next_node_id, Listener, NodeId, NotifyError};
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

/// Callback type for change notifications.
pub type ChangeCallback = Box<dyn Fn(&Change)>;

/// A listener that invokes a callback for every change it receives.
pub struct Observer {
    id: NodeId,
    callback: ChangeCallback,
    active: Cell<bool>,
}

impl Observer {
    /// Creates a new observer.
    pub fn new<F>(callback: F) -> Rc<Self>
    where
        F: Fn(&Change) + 'static,
    {
        Rc::new(Self {
            id: next_node_id(),
            callback: Box::new(callback),
            active: Cell::new(true),
        })
    }

    /// Returns the observer ID.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns whether this observer is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Stops invoking the callback without unsubscribing.
    #[inline]
    pub fn deactivate(&self) {
        self.active.set(false);
    }
}

impl Listener for Observer {
    fn listener_id(&self) -> NodeId {
        self.id
    }

    fn update(&self, change: &Change) -> Result<(), NotifyError> {
        if self.active.get() {
            (self.callback)(change);
        }
        Ok(())
    }
}
