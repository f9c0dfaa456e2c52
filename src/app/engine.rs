//! Analysis orchestration: one run builds the graph, ranks both scopes,
//! computes coupling, and answers queries from the memoized results.

use std::collections::BTreeMap;
use std::collections::HashMap;

use tracing::{info, warn};

use crate::app::dto::{AnalysisReport, ArtifactRankDto, PackageCouplingDto};
use crate::domain::artifact::ArtifactKey;
use crate::domain::coupling::{CouplingAnalysis, PackageCouplingRecord};
use crate::domain::graph::DependencyGraph;
use crate::domain::model::SourceModel;
use crate::domain::rank::{RankError, RankScope, RankedArtifact, compute_code_rank};
use crate::domain::strategy::{StrategyKind, build_graph};

/// Which extraction strategies feed the graph for a run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub strategies: Vec<StrategyKind>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyKind::all().to_vec(),
        }
    }
}

type RankTable = HashMap<ArtifactKey, RankedArtifact>;

/// One finished analysis run. All results are computed in [`analyze`] and
/// never recomputed; queries are read-only.
///
/// [`analyze`]: MetricsEngine::analyze
pub struct MetricsEngine {
    graph: DependencyGraph,
    class_ranks: Result<RankTable, RankError>,
    package_ranks: Result<RankTable, RankError>,
    coupling: CouplingAnalysis,
}

impl MetricsEngine {
    pub fn analyze(model: &SourceModel, config: &AnalysisConfig) -> Self {
        let graph = build_graph(model, &config.strategies);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph frozen"
        );

        let class_ranks = compute_code_rank(&graph, RankScope::Types);
        if let Err(err) = &class_ranks {
            warn!(%err, "type-scope code rank unavailable");
        }
        let package_ranks = compute_code_rank(&graph, RankScope::Packages);
        if let Err(err) = &package_ranks {
            warn!(%err, "package-scope code rank unavailable");
        }

        let coupling = CouplingAnalysis::compute(&graph);

        Self {
            graph,
            class_ranks,
            package_ranks,
            coupling,
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Type-scope ranks, or the cycle error that prevented them.
    pub fn class_ranks(&self) -> Result<&RankTable, &RankError> {
        self.class_ranks.as_ref()
    }

    /// Package-scope ranks, or the cycle error that prevented them.
    pub fn package_ranks(&self) -> Result<&RankTable, &RankError> {
        self.package_ranks.as_ref()
    }

    /// All metrics computed for `key`, merged across the rank scopes and
    /// the coupling pass. Unknown artifacts yield an empty map.
    pub fn node_metrics(&self, key: &str) -> BTreeMap<&'static str, f64> {
        let mut metrics = self.coupling.node_metrics(key);
        for table in [&self.class_ranks, &self.package_ranks] {
            if let Ok(ranks) = table
                && let Some(ranked) = ranks.get(key)
            {
                metrics.insert("cr", ranked.forward());
                metrics.insert("rcr", ranked.reverse());
            }
        }
        metrics
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageCouplingRecord> {
        self.coupling.records().iter()
    }

    /// First dependency cycle reachable from the given package, if any.
    pub fn cycle(&self, key: &str) -> Option<&[ArtifactKey]> {
        self.coupling.cycle(key)
    }

    /// Full run results as a serializable report.
    pub fn report(&self) -> AnalysisReport {
        let mut artifacts: Vec<ArtifactRankDto> = Vec::new();
        for table in [&self.class_ranks, &self.package_ranks] {
            if let Ok(ranks) = table {
                artifacts.extend(ranks.values().map(|r| ArtifactRankDto {
                    key: r.key().to_string(),
                    name: r.name().to_string(),
                    cr: r.forward(),
                    rcr: r.reverse(),
                }));
            }
        }
        artifacts.sort_by(|a, b| b.cr.total_cmp(&a.cr).then_with(|| a.key.cmp(&b.key)));

        let packages = self
            .coupling
            .records()
            .iter()
            .map(|record| PackageCouplingDto {
                name: record.name().to_string(),
                ca: record.afferent_coupling(),
                ce: record.efferent_coupling(),
                total_classes: record.total_classes(),
                concrete_classes: record.concrete_classes(),
                abstract_classes: record.abstract_classes(),
                abstractness: record.abstractness(),
                instability: record.instability(),
                distance: record.distance(),
                afferent: record.afferent().to_vec(),
                efferent: record.efferent().to_vec(),
                cycle: record.cycle().map(<[ArtifactKey]>::to_vec),
            })
            .collect();

        AnalysisReport {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            class_rank_error: self.class_ranks.as_ref().err().map(ToString::to_string),
            package_rank_error: self.package_ranks.as_ref().err().map(ToString::to_string),
            artifacts,
            packages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{MethodDecl, PackageDecl, TypeDecl, TypeDeclKind, TypeRef};

    fn class(name: &str) -> TypeDecl {
        TypeDecl {
            name: name.into(),
            kind: TypeDeclKind::Class,
            is_abstract: false,
            extends: vec![],
            methods: vec![],
            properties: vec![],
        }
    }

    fn simple_model() -> SourceModel {
        let mut bar = class("Bar");
        bar.extends.push(TypeRef::new("shop", "Foo"));
        SourceModel {
            packages: vec![PackageDecl {
                name: "shop".into(),
                types: vec![class("Foo"), bar],
                functions: vec![],
            }],
        }
    }

    #[test]
    fn test_engine_merges_rank_and_coupling_metrics() {
        let engine = MetricsEngine::analyze(&simple_model(), &AnalysisConfig::default());

        let foo = engine.node_metrics("shop::Foo");
        assert!(foo.contains_key("cr"));
        assert!(foo.contains_key("rcr"));
        assert!(!foo.contains_key("ca"));

        let shop = engine.node_metrics("shop");
        for key in ["cr", "rcr", "ca", "ce", "a", "i", "d"] {
            assert!(shop.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_unknown_artifact_yields_empty_metrics() {
        let engine = MetricsEngine::analyze(&simple_model(), &AnalysisConfig::default());
        assert!(engine.node_metrics("mystery::Thing").is_empty());
    }

    #[test]
    fn test_cycle_in_one_scope_leaves_the_other_usable() {
        // Type level acyclic, package level p1 <-> p2.
        let mut a = class("A");
        a.methods.push(MethodDecl {
            name: "use_b".into(),
            references: vec![TypeRef::new("p2", "B")],
            ..Default::default()
        });
        let mut c = class("C");
        c.methods.push(MethodDecl {
            name: "use_d".into(),
            references: vec![TypeRef::new("p1", "D")],
            ..Default::default()
        });
        let model = SourceModel {
            packages: vec![
                PackageDecl {
                    name: "p1".into(),
                    types: vec![a, class("D")],
                    functions: vec![],
                },
                PackageDecl {
                    name: "p2".into(),
                    types: vec![class("B"), c],
                    functions: vec![],
                },
            ],
        };

        let engine = MetricsEngine::analyze(&model, &AnalysisConfig::default());
        assert!(engine.class_ranks().is_ok());
        assert!(engine.package_ranks().is_err());
        // Coupling still fully available.
        assert_eq!(engine.packages().count(), 2);
        assert_eq!(engine.cycle("p1").unwrap(), ["p1", "p2"]);

        let report = engine.report();
        assert!(report.class_rank_error.is_none());
        assert!(report.package_rank_error.is_some());
    }

    #[test]
    fn test_report_orders_artifacts_by_forward_rank() {
        let engine = MetricsEngine::analyze(&simple_model(), &AnalysisConfig::default());
        let report = engine.report();
        assert!(!report.artifacts.is_empty());
        for pair in report.artifacts.windows(2) {
            assert!(pair[0].cr >= pair[1].cr);
        }
    }
}
