//! Dependency extraction strategies.
//!
//! Each strategy reads the resolved model and emits dependency edges of one
//! kind. Strategies run together in a single traversal and accumulate into
//! one shared graph; which ones run is configuration (`coderank-mode`).

use std::fmt;
use std::str::FromStr;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::domain::artifact::{Artifact, function_key, type_key};
use crate::domain::edge::EdgeKind;
use crate::domain::graph::{DependencyGraph, GraphBuilder};
use crate::domain::model::{PackageDecl, SourceModel, TypeDecl, TypeDeclKind, TypeRef};

/// Recognized extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Superclass / implemented-interface edges.
    Inheritance,
    /// Method signature and body reference edges (multiplicity preserved).
    Method,
    /// Declared property type edges.
    Property,
}

impl StrategyKind {
    pub fn all() -> [StrategyKind; 3] {
        [
            StrategyKind::Inheritance,
            StrategyKind::Method,
            StrategyKind::Property,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Inheritance => "inheritance",
            StrategyKind::Method => "method",
            StrategyKind::Property => "property",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inheritance" => Ok(StrategyKind::Inheritance),
            "method" => Ok(StrategyKind::Method),
            "property" => Ok(StrategyKind::Property),
            _ => Err(format!(
                "Unknown strategy: '{}'. Valid values: inheritance, method, property",
                s
            )),
        }
    }
}

/// Build the dependency graph for `model` with the given strategies active.
///
/// Pass 1 allocates nodes for every declared package, type and free
/// function, so artifacts without dependencies still appear in the graph.
/// Pass 2 wires edges; dependency targets that were never declared are
/// allocated lazily as concrete class placeholders.
pub fn build_graph(model: &SourceModel, strategies: &[StrategyKind]) -> DependencyGraph {
    let mut builder = GraphBuilder::new();

    // Pass 1: node allocation.
    for package in &model.packages {
        builder.ensure_node(Artifact::package(&package.name));
        for ty in &package.types {
            builder.ensure_node(declared_type(&package.name, ty));
        }
        for function in &package.functions {
            builder.ensure_node(Artifact::function(&package.name, &function.name));
        }
    }

    // Pass 2: edge wiring, one visit per artifact with every active
    // strategy applied to it.
    for package in &model.packages {
        for ty in &package.types {
            visit_type(&mut builder, package, ty, strategies);
        }
        if strategies.contains(&StrategyKind::Method) {
            for function in &package.functions {
                let source = builder
                    .node_index(&function_key(&package.name, &function.name))
                    .expect("allocated in pass 1");
                for dep in function.dependencies() {
                    add_reference(&mut builder, source, dep, EdgeKind::MethodReference);
                }
            }
        }
    }

    debug!(
        nodes = builder.node_count(),
        strategies = strategies.len(),
        "dependency graph populated"
    );
    builder.freeze()
}

fn visit_type(
    builder: &mut GraphBuilder,
    package: &PackageDecl,
    ty: &TypeDecl,
    strategies: &[StrategyKind],
) {
    let source = builder
        .node_index(&type_key(&package.name, &ty.name))
        .expect("allocated in pass 1");

    for strategy in strategies {
        match strategy {
            StrategyKind::Inheritance => {
                for parent in &ty.extends {
                    add_reference(builder, source, parent, EdgeKind::Inherits);
                }
            }
            StrategyKind::Method => {
                for method in &ty.methods {
                    let visited = Artifact::method(&package.name, &ty.name, &method.name);
                    let Some(attributed) = attribution(builder, &visited) else {
                        continue;
                    };
                    for dep in method.dependencies() {
                        add_reference(builder, attributed, dep, EdgeKind::MethodReference);
                    }
                }
            }
            StrategyKind::Property => {
                for property in &ty.properties {
                    if let Some(declared) = &property.declared_type {
                        add_reference(builder, source, declared, EdgeKind::PropertyType);
                    }
                }
            }
        }
    }
}

/// Node that carries an artifact's edges: a method attributes to its
/// declaring type, everything else to its own node.
fn attribution(builder: &GraphBuilder, artifact: &Artifact) -> Option<NodeIndex> {
    match artifact {
        Artifact::Method(m) => m.owner.as_deref().and_then(|key| builder.node_index(key)),
        _ => builder.node_index(&artifact.core().key),
    }
}

fn add_reference(builder: &mut GraphBuilder, source: NodeIndex, dep: &TypeRef, kind: EdgeKind) {
    let target = match builder.node_index(&dep.key()) {
        Some(idx) => idx,
        // Referenced but never declared: a placeholder concrete class.
        None => builder.ensure_node(Artifact::class(&dep.package, &dep.name, false)),
    };
    builder.add_dependency(source, target, kind);
}

fn declared_type(package: &str, ty: &TypeDecl) -> Artifact {
    match ty.kind {
        TypeDeclKind::Class => Artifact::class(package, &ty.name, ty.is_abstract),
        TypeDeclKind::Interface => Artifact::interface(package, &ty.name),
    }
}
