//! Package coupling metrics over the frozen dependency graph.
//!
//! # Metrics
//!
//! - **Ca (afferent coupling)**: distinct packages that depend ON this one
//! - **Ce (efferent coupling)**: distinct packages this one depends ON
//! - **Abstractness (A)**: abstract types / total types
//! - **Instability (I)**: Ce / (Ca + Ce), 0 when the package has no coupling
//! - **Distance (D)**: |A + I - 1|, deviation from the main sequence A+I=1
//!
//! Coupling deduplicates to distinct packages; the edge multiset that feeds
//! CodeRank's denominators is collapsed here. A first reachable dependency
//! cycle is also recorded per package, found by a depth-first search over
//! the efferent edges with an explicit visitation stack.

use std::collections::BTreeMap;
use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::debug;

use crate::domain::artifact::ArtifactKey;
use crate::domain::graph::DependencyGraph;

/// Per-package coupling record: accumulated counts plus derived metrics.
#[derive(Debug, Clone, Serialize)]
pub struct PackageCouplingRecord {
    key: ArtifactKey,
    name: String,
    afferent: Vec<ArtifactKey>,
    efferent: Vec<ArtifactKey>,
    total_classes: u32,
    concrete_classes: u32,
    abstract_classes: u32,
    abstractness: f64,
    instability: f64,
    distance: f64,
    cycle: Option<Vec<ArtifactKey>>,
}

impl PackageCouplingRecord {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct packages depending on this one, in first-seen order.
    pub fn afferent(&self) -> &[ArtifactKey] {
        &self.afferent
    }

    /// Distinct packages this one depends on, in first-seen order.
    pub fn efferent(&self) -> &[ArtifactKey] {
        &self.efferent
    }

    pub fn afferent_coupling(&self) -> usize {
        self.afferent.len()
    }

    pub fn efferent_coupling(&self) -> usize {
        self.efferent.len()
    }

    pub fn total_classes(&self) -> u32 {
        self.total_classes
    }

    pub fn concrete_classes(&self) -> u32 {
        self.concrete_classes
    }

    pub fn abstract_classes(&self) -> u32 {
        self.abstract_classes
    }

    pub fn abstractness(&self) -> f64 {
        self.abstractness
    }

    pub fn instability(&self) -> f64 {
        self.instability
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// First dependency cycle reachable from this package, if any.
    pub fn cycle(&self) -> Option<&[ArtifactKey]> {
        self.cycle.as_deref()
    }
}

/// Result of one coupling pass; built once per run and queried read-only.
pub struct CouplingAnalysis {
    records: Vec<PackageCouplingRecord>,
    by_key: HashMap<ArtifactKey, usize>,
}

impl CouplingAnalysis {
    /// Run the batch pass: accumulate per-package counts, then derive
    /// abstractness, instability and distance once all packages are
    /// visited, then search for cycles.
    pub fn compute(graph: &DependencyGraph) -> Self {
        // Deduplicated package adjacency in edge insertion order.
        let mut efferent: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
        let mut afferent: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
        for (source, target, _) in graph.edges() {
            if graph.artifact(source).is_package() && graph.artifact(target).is_package() {
                push_unique(efferent.entry(source).or_default(), target);
                push_unique(afferent.entry(target).or_default(), source);
            }
        }

        // Class counts, grouped by containing package.
        let mut counts: HashMap<ArtifactKey, (u32, u32, u32)> = HashMap::new();
        for idx in graph.node_indices() {
            let artifact = graph.artifact(idx);
            if !artifact.is_type() {
                continue;
            }
            let Some(package) = artifact.core().package.clone() else {
                continue;
            };
            let entry = counts.entry(package).or_default();
            entry.0 += 1;
            if artifact.is_abstract() {
                entry.1 += 1;
            } else {
                entry.2 += 1;
            }
        }

        let mut records = Vec::new();
        let mut by_key = HashMap::new();
        for idx in graph.node_indices() {
            let artifact = graph.artifact(idx);
            if !artifact.is_package() {
                continue;
            }
            let core = artifact.core();
            // A package with no classes contributes no metrics.
            let Some(&(tc, ac, cc)) = counts.get(&core.key) else {
                continue;
            };

            let aff = keys_of(graph, afferent.get(&idx));
            let eff = keys_of(graph, efferent.get(&idx));
            let ca = aff.len() as f64;
            let ce = eff.len() as f64;

            let abstractness = if tc == 0 { 0.0 } else { f64::from(ac) / f64::from(tc) };
            let instability = if ca + ce == 0.0 { 0.0 } else { ce / (ca + ce) };
            let distance = (abstractness + instability - 1.0).abs();

            let cycle = find_cycle(&efferent, idx)
                .map(|path| path.iter().map(|&p| key_of(graph, p)).collect());

            by_key.insert(core.key.clone(), records.len());
            records.push(PackageCouplingRecord {
                key: core.key.clone(),
                name: core.name.clone(),
                afferent: aff,
                efferent: eff,
                total_classes: tc,
                concrete_classes: cc,
                abstract_classes: ac,
                abstractness,
                instability,
                distance,
                cycle,
            });
        }

        debug!(packages = records.len(), "package coupling computed");
        Self { records, by_key }
    }

    pub fn records(&self) -> &[PackageCouplingRecord] {
        &self.records
    }

    pub fn record(&self, key: &str) -> Option<&PackageCouplingRecord> {
        self.by_key.get(key).map(|&i| &self.records[i])
    }

    pub fn cycle(&self, key: &str) -> Option<&[ArtifactKey]> {
        self.record(key).and_then(PackageCouplingRecord::cycle)
    }

    /// Coupling metrics for one package, empty for anything else.
    pub fn node_metrics(&self, key: &str) -> BTreeMap<&'static str, f64> {
        let mut metrics = BTreeMap::new();
        if let Some(record) = self.record(key) {
            metrics.insert("ca", record.afferent_coupling() as f64);
            metrics.insert("ce", record.efferent_coupling() as f64);
            metrics.insert("a", record.abstractness());
            metrics.insert("i", record.instability());
            metrics.insert("d", record.distance());
        }
        metrics
    }
}

fn push_unique(list: &mut Vec<NodeIndex>, idx: NodeIndex) {
    if !list.contains(&idx) {
        list.push(idx);
    }
}

fn key_of(graph: &DependencyGraph, idx: NodeIndex) -> ArtifactKey {
    graph.artifact(idx).core().key.clone()
}

fn keys_of(graph: &DependencyGraph, indices: Option<&Vec<NodeIndex>>) -> Vec<ArtifactKey> {
    indices
        .map(|list| list.iter().map(|&i| key_of(graph, i)).collect())
        .unwrap_or_default()
}

/// Depth-first search for the first cycle reachable from `start`.
///
/// The stack is the current visitation path; revisiting a stack member
/// closes a cycle consisting of the stack suffix from its first occurrence.
/// Only the first cycle per starting package is reported.
fn find_cycle(
    efferent: &HashMap<NodeIndex, Vec<NodeIndex>>,
    start: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    let mut stack = Vec::new();
    visit(efferent, start, &mut stack)
}

fn visit(
    efferent: &HashMap<NodeIndex, Vec<NodeIndex>>,
    node: NodeIndex,
    stack: &mut Vec<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    if let Some(pos) = stack.iter().position(|&n| n == node) {
        return Some(stack[pos..].to_vec());
    }
    stack.push(node);
    if let Some(targets) = efferent.get(&node) {
        for &next in targets {
            if let Some(cycle) = visit(efferent, next, stack) {
                return Some(cycle);
            }
        }
    }
    stack.pop();
    None
}
