//! The resource graph.
//!
//! A [`GraphBuilder`] accumulates declarations during one assembly pass and
//! [`GraphBuilder::finalize`] turns them into an immutable [`ResourceGraph`],
//! rejecting anything the engine could not realize: duplicate ids, dangling
//! references, out-of-range policies, stale asset hashes, cycles.

mod builder;
pub mod dag;
mod types;

pub use builder::GraphBuilder;
pub use types::*;
