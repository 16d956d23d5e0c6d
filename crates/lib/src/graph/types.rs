//! Graph error and result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reference::{Deferred, ReferenceError};
use crate::resource::{Declaration, LogicalId, ResourceKind};
use crate::util::hash::ContentHash;

use super::dag::DependencyDag;

/// Errors raised while assembling or finalizing a graph.
///
/// All of them are construction defects: the input must be fixed and the
/// assembly re-run.
#[derive(Debug, Error)]
pub enum GraphError {
  #[error("duplicate logical id: {0}")]
  DuplicateId(LogicalId),

  #[error("{from}: reference to undeclared resource {reference}")]
  UnresolvedReference { from: LogicalId, reference: Deferred },

  #[error("{from}: {kind} {target} does not expose attribute '{attribute}'")]
  UnknownAttribute {
    from: LogicalId,
    target: LogicalId,
    kind: ResourceKind,
    attribute: String,
  },

  #[error("{from}: expected {target} to be a {expected}, found {found}")]
  KindMismatch {
    from: LogicalId,
    target: LogicalId,
    expected: ResourceKind,
    found: ResourceKind,
  },

  #[error("{from}: depends on undeclared resource {to}")]
  UnknownDependency { from: LogicalId, to: LogicalId },

  #[error("{id}: invalid policy: {message}")]
  InvalidPolicy { id: LogicalId, message: String },

  #[error("{function}: declared source hash {declared} does not match asset {asset} ({actual})")]
  HashDrift {
    function: LogicalId,
    asset: LogicalId,
    declared: ContentHash,
    actual: ContentHash,
  },

  #[error("{function}: must reference exactly one artifact asset, found {count}")]
  AssetOwnership { function: LogicalId, count: usize },

  #[error("{id}: {source}")]
  Reference {
    id: LogicalId,
    #[source]
    source: ReferenceError,
  },

  #[error("dependency cycle detected")]
  CycleDetected,
}

/// Provider configuration bound to the graph's target environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBinding {
  pub name: String,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub config: BTreeMap<String, String>,
}

impl ProviderBinding {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      config: BTreeMap::new(),
    }
  }

  pub fn with(mut self, key: &str, value: &str) -> Self {
    self.config.insert(key.to_string(), value.to_string());
    self
  }
}

/// A reference edge: `dependent` uses something realized by `dependency`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
  pub dependency: LogicalId,
  pub dependent: LogicalId,
}

/// A finalized, immutable resource graph.
///
/// Declarations keep assembly order; edges are sorted. Both serialize
/// deterministically, so identical inputs produce identical JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceGraph {
  pub stack: String,
  pub providers: Vec<ProviderBinding>,
  pub declarations: Vec<Declaration>,
  pub edges: Vec<Edge>,
  #[serde(skip)]
  pub(super) dag: DependencyDag,
}

impl PartialEq for ResourceGraph {
  fn eq(&self, other: &Self) -> bool {
    self.stack == other.stack
      && self.providers == other.providers
      && self.declarations == other.declarations
      && self.edges == other.edges
  }
}

impl ResourceGraph {
  pub fn get(&self, id: &str) -> Option<&Declaration> {
    self.declarations.iter().find(|d| d.id.as_str() == id)
  }

  pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Declaration> {
    self.declarations.iter().filter(move |d| d.kind() == kind)
  }

  pub fn count(&self, kind: ResourceKind) -> usize {
    self.of_kind(kind).count()
  }

  pub fn len(&self) -> usize {
    self.declarations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.declarations.is_empty()
  }

  pub fn has_provider(&self, name: &str) -> bool {
    self.providers.iter().any(|p| p.name == name)
  }

  /// Direct dependencies of a declaration.
  pub fn dependencies(&self, id: &LogicalId) -> Vec<LogicalId> {
    self.dag.dependencies(id)
  }

  /// Direct dependents of a declaration.
  pub fn dependents(&self, id: &LogicalId) -> Vec<LogicalId> {
    self.dag.dependents(id)
  }

  /// Declarations grouped so every dependency sits in an earlier wave.
  pub fn creation_waves(&self) -> Result<Vec<Vec<LogicalId>>, GraphError> {
    self.dag.waves()
  }

  pub fn topological_order(&self) -> Result<Vec<LogicalId>, GraphError> {
    self.dag.topological_order()
  }
}
