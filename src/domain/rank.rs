//! CodeRank engine: damped, PageRank-style importance ranks over the
//! dependency graph.
//!
//! Forward rank flows from an artifact's dependents: each dependent
//! distributes its own rank evenly across everything it requires, so an
//! artifact accumulates rank proportional to how important, and how
//! exclusively, its dependents rely on it. Reverse rank is the symmetric
//! computation with the edge roles swapped.
//!
//! The one-pass formula needs a topological processing order, so the graph
//! within the requested scope must be acyclic; a cycle aborts that scope
//! with [`RankError::GraphNotAcyclic`] instead of producing an approximate
//! ranking.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use petgraph::graph::NodeIndex;
use thiserror::Error;
use tracing::debug;

use crate::domain::artifact::ArtifactKey;
use crate::domain::graph::DependencyGraph;

/// Fraction of rank inherited from neighbors vs. the flat baseline.
pub const DAMPING_FACTOR: f64 = 0.85;

/// Rank of an artifact nothing points at: `1 - d`.
pub const BASE_RANK: f64 = 1.0 - DAMPING_FACTOR;

/// Which artifacts a rank computation covers. Scopes are ranked
/// independently; a cycle in one does not poison the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankScope {
    /// Classes and interfaces.
    Types,
    /// Packages, over the mirrored package-level edges.
    Packages,
}

impl fmt::Display for RankScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankScope::Types => write!(f, "type"),
            RankScope::Packages => write!(f, "package"),
        }
    }
}

/// Errors surfaced by the rank computation.
#[derive(Debug, Error)]
pub enum RankError {
    /// The scoped graph contains at least one dependency cycle, so the
    /// topological pass cannot terminate.
    #[error("dependency graph is not acyclic: {remaining} {scope} artifact(s) left unranked")]
    GraphNotAcyclic { scope: RankScope, remaining: usize },

    /// A computed rank fell outside the valid range; callers violating the
    /// value-object contract see this rather than a silently clamped value.
    #[error("rank {value} for `{artifact}` is outside [0.0, 1.0]")]
    RankOutOfRange { artifact: ArtifactKey, value: f64 },
}

/// Ranked artifact: forward and reverse CodeRank, both in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedArtifact {
    key: ArtifactKey,
    name: String,
    forward: f64,
    reverse: f64,
}

impl RankedArtifact {
    pub fn new(key: ArtifactKey, name: String) -> Self {
        Self {
            key,
            name,
            forward: BASE_RANK,
            reverse: BASE_RANK,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn forward(&self) -> f64 {
        self.forward
    }

    pub fn reverse(&self) -> f64 {
        self.reverse
    }

    pub fn set_forward(&mut self, value: f64) -> Result<(), RankError> {
        self.forward = self.validated(value)?;
        Ok(())
    }

    pub fn set_reverse(&mut self, value: f64) -> Result<(), RankError> {
        self.reverse = self.validated(value)?;
        Ok(())
    }

    fn validated(&self, value: f64) -> Result<f64, RankError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(RankError::RankOutOfRange {
                artifact: self.key.clone(),
                value,
            });
        }
        Ok(value)
    }
}

/// Compute forward and reverse CodeRank for every artifact in `scope`.
///
/// Runs once per scope over the frozen graph; results are keyed by artifact
/// identity and intended to be memoized by the caller.
pub fn compute_code_rank(
    graph: &DependencyGraph,
    scope: RankScope,
) -> Result<HashMap<ArtifactKey, RankedArtifact>, RankError> {
    let nodes: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&idx| in_scope(graph, idx, scope))
        .collect();

    let forward = compute_direction(graph, scope, &nodes, Direction::Forward)?;
    let reverse = compute_direction(graph, scope, &nodes, Direction::Reverse)?;

    let mut ranked = HashMap::with_capacity(nodes.len());
    for &idx in &nodes {
        let core = graph.artifact(idx).core();
        let mut artifact = RankedArtifact::new(core.key.clone(), core.name.clone());
        artifact.set_forward(forward[&idx])?;
        artifact.set_reverse(reverse[&idx])?;
        ranked.insert(core.key.clone(), artifact);
    }

    debug!(scope = %scope, artifacts = ranked.len(), "code rank computed");
    Ok(ranked)
}

/// Forward peels dependents first; reverse peels dependencies first.
#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Reverse,
}

fn compute_direction(
    graph: &DependencyGraph,
    scope: RankScope,
    nodes: &[NodeIndex],
    direction: Direction,
) -> Result<HashMap<NodeIndex, f64>, RankError> {
    // Scoped degree bookkeeping: `pending` drives the leaf peeling,
    // `spread` is the denominator each neighbor divides its rank by.
    let mut pending: HashMap<NodeIndex, usize> = HashMap::with_capacity(nodes.len());
    let mut spread: HashMap<NodeIndex, usize> = HashMap::with_capacity(nodes.len());
    for &idx in nodes {
        let (inputs, outputs) = match direction {
            Direction::Forward => (
                scoped_count(graph, idx, scope, Direction::Forward),
                scoped_count(graph, idx, scope, Direction::Reverse),
            ),
            Direction::Reverse => (
                scoped_count(graph, idx, scope, Direction::Reverse),
                scoped_count(graph, idx, scope, Direction::Forward),
            ),
        };
        pending.insert(idx, inputs);
        spread.insert(idx, outputs);
    }

    let mut queue: VecDeque<NodeIndex> = nodes
        .iter()
        .copied()
        .filter(|idx| pending[idx] == 0)
        .collect();
    let mut ranks: HashMap<NodeIndex, f64> = HashMap::with_capacity(nodes.len());

    while let Some(idx) = queue.pop_front() {
        let mut sum = 0.0;
        for source in scoped_inputs(graph, idx, scope, direction) {
            sum += ranks[&source] / spread[&source].max(1) as f64;
        }
        ranks.insert(idx, BASE_RANK + DAMPING_FACTOR * sum);

        for next in scoped_outputs(graph, idx, scope, direction) {
            let left = pending
                .get_mut(&next)
                .expect("scoped neighbor has a pending entry");
            *left -= 1;
            if *left == 0 {
                queue.push_back(next);
            }
        }
    }

    if ranks.len() != nodes.len() {
        return Err(RankError::GraphNotAcyclic {
            scope,
            remaining: nodes.len() - ranks.len(),
        });
    }
    Ok(ranks)
}

fn in_scope(graph: &DependencyGraph, idx: NodeIndex, scope: RankScope) -> bool {
    match scope {
        RankScope::Types => graph.artifact(idx).is_type(),
        RankScope::Packages => graph.artifact(idx).is_package(),
    }
}

/// Edge occurrences feeding rank INTO `idx` for the given direction:
/// dependents for forward, dependencies for reverse.
fn scoped_inputs<'g>(
    graph: &'g DependencyGraph,
    idx: NodeIndex,
    scope: RankScope,
    direction: Direction,
) -> impl Iterator<Item = NodeIndex> + 'g {
    let iter: Box<dyn Iterator<Item = NodeIndex> + 'g> = match direction {
        Direction::Forward => Box::new(graph.required_by(idx)),
        Direction::Reverse => Box::new(graph.requires(idx)),
    };
    iter.filter(move |&other| in_scope(graph, other, scope))
}

fn scoped_outputs<'g>(
    graph: &'g DependencyGraph,
    idx: NodeIndex,
    scope: RankScope,
    direction: Direction,
) -> impl Iterator<Item = NodeIndex> + 'g {
    let iter: Box<dyn Iterator<Item = NodeIndex> + 'g> = match direction {
        Direction::Forward => Box::new(graph.requires(idx)),
        Direction::Reverse => Box::new(graph.required_by(idx)),
    };
    iter.filter(move |&other| in_scope(graph, other, scope))
}

fn scoped_count(
    graph: &DependencyGraph,
    idx: NodeIndex,
    scope: RankScope,
    direction: Direction,
) -> usize {
    scoped_inputs(graph, idx, scope, direction).count()
}
