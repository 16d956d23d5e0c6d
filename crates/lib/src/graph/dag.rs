//! Dependency DAG over declarations.
//!
//! Edges run from dependency to dependent. Used to reject cycles at
//! finalization and to group declarations into creation waves for display.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::resource::LogicalId;

use super::types::{Edge, GraphError};

#[derive(Debug, Clone, Default)]
pub struct DependencyDag {
  graph: DiGraph<LogicalId, ()>,
  nodes: HashMap<LogicalId, NodeIndex>,
}

impl DependencyDag {
  /// Build the DAG from node ids (in declaration order) and edges.
  ///
  /// Edges naming unknown nodes are ignored; the builder has already
  /// rejected unresolved references by the time this runs.
  ///
  /// # Errors
  ///
  /// Returns `CycleDetected` if the edges form a cycle.
  pub fn new<'a>(ids: impl IntoIterator<Item = &'a LogicalId>, edges: &[Edge]) -> Result<Self, GraphError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for id in ids {
      let idx = graph.add_node(id.clone());
      nodes.insert(id.clone(), idx);
    }

    for edge in edges {
      if let (Some(&from), Some(&to)) = (nodes.get(&edge.dependency), nodes.get(&edge.dependent)) {
        graph.update_edge(from, to, ());
      }
    }

    let dag = Self { graph, nodes };
    dag.verify_acyclic()?;
    Ok(dag)
  }

  fn verify_acyclic(&self) -> Result<(), GraphError> {
    toposort(&self.graph, None).map_err(|_| GraphError::CycleDetected)?;
    Ok(())
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn topological_order(&self) -> Result<Vec<LogicalId>, GraphError> {
    let sorted = toposort(&self.graph, None).map_err(|_| GraphError::CycleDetected)?;
    Ok(sorted.into_iter().map(|idx| self.graph[idx].clone()).collect())
  }

  pub fn dependencies(&self, id: &LogicalId) -> Vec<LogicalId> {
    self.neighbors(id, Direction::Incoming)
  }

  pub fn dependents(&self, id: &LogicalId) -> Vec<LogicalId> {
    self.neighbors(id, Direction::Outgoing)
  }

  fn neighbors(&self, id: &LogicalId, direction: Direction) -> Vec<LogicalId> {
    let Some(&idx) = self.nodes.get(id) else {
      return Vec::new();
    };

    let mut ids: Vec<LogicalId> = self
      .graph
      .neighbors_directed(idx, direction)
      .map(|n| self.graph[n].clone())
      .collect();
    ids.sort();
    ids
  }

  /// Group nodes into waves where each node's dependencies are all in
  /// earlier waves. Within a wave, nodes keep declaration order.
  pub fn waves(&self) -> Result<Vec<Vec<LogicalId>>, GraphError> {
    let mut in_degree: HashMap<NodeIndex, usize> = HashMap::new();
    let mut node_level: HashMap<NodeIndex, usize> = HashMap::new();

    for idx in self.graph.node_indices() {
      in_degree.insert(idx, self.graph.neighbors_directed(idx, Direction::Incoming).count());
    }

    let mut current_level = 0;
    let mut remaining: HashSet<NodeIndex> = self.graph.node_indices().collect();

    while !remaining.is_empty() {
      let ready: Vec<NodeIndex> = remaining.iter().filter(|&&idx| in_degree[&idx] == 0).copied().collect();

      if ready.is_empty() {
        return Err(GraphError::CycleDetected);
      }

      for &idx in &ready {
        node_level.insert(idx, current_level);
        remaining.remove(&idx);
      }

      // Decrement only after the whole level is assigned, so a node never
      // lands in the same wave as its dependency
      for &idx in &ready {
        for neighbor in self.graph.neighbors_directed(idx, Direction::Outgoing) {
          if let Some(deg) = in_degree.get_mut(&neighbor) {
            *deg = deg.saturating_sub(1);
          }
        }
      }

      current_level += 1;
    }

    let max_level = node_level.values().copied().max().unwrap_or(0);
    let mut waves: Vec<Vec<LogicalId>> = vec![Vec::new(); max_level + 1];

    for idx in self.graph.node_indices() {
      if let Some(&level) = node_level.get(&idx) {
        waves[level].push(self.graph[idx].clone());
      }
    }

    waves.retain(|w| !w.is_empty());
    Ok(waves)
  }
}
