//! Resource declarations.
//!
//! A declaration names one resource the engine should realize: its logical
//! id, its attributes, and any explicit ordering dependencies. Attributes
//! that depend on another resource's realized state carry a
//! [`Deferred`](crate::reference::Deferred) token instead of a value.

mod types;

pub use types::*;
