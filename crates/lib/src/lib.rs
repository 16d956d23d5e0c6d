//! thumbstack-lib: resource graph assembly for the thumbnail pipeline
//!
//! This crate turns a [`StackConfig`](config::StackConfig) into a validated,
//! deterministic resource graph and renders it for a provisioning engine:
//! - `stack`: assemblers for buckets, functions, endpoints and notifications
//! - `graph`: the graph builder, its invariants and creation order
//! - `manifest`: engine manifest synthesis and asset packaging
//! - `outputs` / `site`: post-realization env files and static site sync

pub mod asset;
pub mod config;
pub mod consts;
pub mod graph;
pub mod manifest;
pub mod outputs;
pub mod reference;
pub mod resource;
pub mod site;
pub mod stack;
pub mod util;
