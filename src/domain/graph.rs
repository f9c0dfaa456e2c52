//! Dependency graph - the shared structure all extraction strategies
//! populate.
//!
//! The graph lives in two phases enforced by the type system: a
//! [`GraphBuilder`] is mutable and exists only while the model traversal
//! runs; [`GraphBuilder::freeze`] consumes it and hands back a
//! [`DependencyGraph`] that exposes reads only. Parallel edges are kept:
//! `requires`/`required_by` are multisets, and the rank computation divides
//! by the *count* of outbound edges, so repeated references carry weight.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::domain::artifact::{Artifact, ArtifactKey};
use crate::domain::edge::EdgeKind;

/// Frozen dependency graph: read-only view handed to the metric engines.
pub struct DependencyGraph {
    graph: DiGraph<Artifact, EdgeKind>,
    key_to_node: HashMap<ArtifactKey, NodeIndex>,
}

impl DependencyGraph {
    pub fn node_index(&self, key: &str) -> Option<NodeIndex> {
        self.key_to_node.get(key).copied()
    }

    pub fn artifact(&self, idx: NodeIndex) -> &Artifact {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node indices in allocation order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Artifacts this one depends on, one entry per edge occurrence.
    pub fn requires(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
    }

    /// Artifacts depending on this one, one entry per edge occurrence.
    pub fn required_by(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
    }

    pub fn requires_count(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    pub fn required_by_count(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// All edges in insertion order as `(source, target, kind)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, EdgeKind)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), *e.weight()))
    }
}

/// Mutable graph under construction; only the traversal phase holds one.
pub struct GraphBuilder {
    graph: DiGraph<Artifact, EdgeKind>,
    key_to_node: HashMap<ArtifactKey, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            key_to_node: HashMap::new(),
        }
    }

    /// Look up or allocate the node for `artifact`. The first allocation
    /// wins; later calls with the same key return the existing node.
    pub fn ensure_node(&mut self, artifact: Artifact) -> NodeIndex {
        let key = artifact.core().key.clone();
        if let Some(&idx) = self.key_to_node.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(artifact);
        self.key_to_node.insert(key, idx);
        idx
    }

    pub fn node_index(&self, key: &str) -> Option<NodeIndex> {
        self.key_to_node.get(key).copied()
    }

    pub fn artifact(&self, idx: NodeIndex) -> &Artifact {
        &self.graph[idx]
    }

    /// Record `requires(source) += target` / `required_by(target) += source`.
    ///
    /// Self-dependencies are never recorded. When the two artifacts live in
    /// different packages the same relation is mirrored onto the packages'
    /// own edge sets, once per occurrence.
    pub fn add_dependency(&mut self, source: NodeIndex, target: NodeIndex, kind: EdgeKind) {
        if source == target {
            return;
        }
        self.graph.add_edge(source, target, kind);

        let source_pkg = self.graph[source].core().package.clone();
        let target_pkg = self.graph[target].core().package.clone();
        if let (Some(sp), Some(tp)) = (source_pkg, target_pkg)
            && sp != tp
        {
            let sp_idx = self.ensure_node(Artifact::package(&sp));
            let tp_idx = self.ensure_node(Artifact::package(&tp));
            self.graph.add_edge(sp_idx, tp_idx, kind);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// End the mutation phase; the returned graph is read-only.
    pub fn freeze(self) -> DependencyGraph {
        DependencyGraph {
            graph: self.graph,
            key_to_node: self.key_to_node,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
