//! Engine manifests.
//!
//! Synthesis renders a finalized [`ResourceGraph`](crate::graph::ResourceGraph)
//! into the provisioning engine's JSON configuration and packages the assets
//! it refers to. Identical graphs render byte-identical manifests.

mod synth;
mod types;

pub use synth::*;
pub use types::*;
