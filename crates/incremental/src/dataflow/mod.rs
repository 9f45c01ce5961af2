//! The lazy dependency graph.

pub mod node;
pub mod source;

pub use node::{DerivedNode, Node, Operator};
pub use source::{resolve, Source};
