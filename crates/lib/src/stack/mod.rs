//! Topology assembly.
//!
//! Each submodule turns one part of the [`StackConfig`](crate::config::StackConfig)
//! into declarations without touching a shared graph; [`StackBuilder`]
//! composes them into a single [`ResourceGraph`](crate::graph::ResourceGraph).
//!
//! - [`bucket`] - storage buckets, discovery entries, notification bindings
//! - [`gateway`] - public functions, endpoints, retry policies, outputs
//! - [`resize`] - the notification-triggered function
//! - [`failure`] - failure topic and subscription
//! - [`frontend`] - static website bucket and env file

pub mod bucket;
mod builder;
pub mod failure;
pub mod frontend;
mod function;
pub mod gateway;
pub mod ids;
pub mod resize;

use thiserror::Error;

use crate::asset::AssetError;
use crate::config::ConfigError;
use crate::graph::GraphError;

pub use builder::StackBuilder;

#[derive(Debug, Error)]
pub enum StackError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("bucket '{bucket}' has notify = true but no target function")]
  MissingTarget { bucket: String },

  #[error("function '{function}': {source}")]
  Asset {
    function: String,
    #[source]
    source: AssetError,
  },
}
