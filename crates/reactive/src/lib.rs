//! Strata Reactive - change notification for the strata dataflow engine.
//!
//! Producers (record sets and derived nodes) push `Change`s to the listeners that
//! subscribed to them. Listeners are held weakly, so subscribing never extends the
//! life of a downstream node, and a listener that fails or does not propagate is
//! skipped without disturbing the producer.
//!
//! # Core Concepts
//!
//! - `Change` / `Selector`: which groups a mutation touched
//! - `Listener`: the update hook implemented by derived nodes
//! - `ListenerSet`: weak registry with failure-swallowing dispatch
//! - `Observer`: callback listener for collaborators outside the graph
//!
//! # Example
//!
//! ```rust
//! use strata_reactive::{Change, ListenerSet, Observer};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let hits = Rc::new(Cell::new(0));
//! let hits_clone = hits.clone();
//! let observer = Observer::new(move |_| hits_clone.set(hits_clone.get() + 1));
//!
//! let mut listeners = ListenerSet::new();
//! listeners.subscribe(&observer);
//! ListenerSet::dispatch(&listeners.live(), &Change::appended(1, 1));
//!
//! assert_eq!(hits.get(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod change_set;
pub mod notify;
pub mod subscription;

pub use change_set::{Change, Selector};
pub use notify::{next_node_id, Listener, ListenerSet, NodeId, NotifyError};
pub use subscription::{ChangeCallback, Observer};
