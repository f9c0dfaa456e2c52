//! Console display helpers for analysis results.

use std::collections::HashMap;

use crate::app::engine::MetricsEngine;
use crate::domain::rank::{RankError, RankedArtifact};

/// Print the top `limit` artifacts per scope by forward rank, plus any
/// scope that failed on a cycle.
pub fn display_ranks(engine: &MetricsEngine, limit: usize) {
    println!("CodeRank (top {} by forward rank):", limit);
    println!("{}", "=".repeat(80));

    print_scope("Types", engine.class_ranks(), limit);
    print_scope("Packages", engine.package_ranks(), limit);
}

fn print_scope(
    label: &str,
    ranks: Result<&HashMap<String, RankedArtifact>, &RankError>,
    limit: usize,
) {
    println!("\n{label}:");
    match ranks {
        Ok(table) => {
            let mut ranked: Vec<&RankedArtifact> = table.values().collect();
            ranked.sort_by(|a, b| {
                b.forward()
                    .total_cmp(&a.forward())
                    .then_with(|| a.key().cmp(b.key()))
            });
            for (i, artifact) in ranked.iter().take(limit).enumerate() {
                println!(
                    "{:3}. cr {:.5}  rcr {:.5}  {}",
                    i + 1,
                    artifact.forward(),
                    artifact.reverse(),
                    artifact.key()
                );
            }
        }
        Err(err) => println!("  unavailable: {err}"),
    }
}

/// Print the coupling table and detected package cycles.
pub fn display_coupling(engine: &MetricsEngine) {
    println!("\nPackage coupling:");
    println!("{}", "=".repeat(80));
    println!(
        "{:<30} {:>4} {:>4} {:>4} {:>7} {:>7} {:>7}",
        "package", "ca", "ce", "tc", "A", "I", "D"
    );

    for record in engine.packages() {
        println!(
            "{:<30} {:>4} {:>4} {:>4} {:>7.3} {:>7.3} {:>7.3}",
            record.name(),
            record.afferent_coupling(),
            record.efferent_coupling(),
            record.total_classes(),
            record.abstractness(),
            record.instability(),
            record.distance()
        );
    }

    let cycles: Vec<_> = engine
        .packages()
        .filter_map(|r| r.cycle().map(|c| (r.name().to_string(), c)))
        .collect();
    if !cycles.is_empty() {
        println!("\nDependency cycles:");
        for (package, cycle) in cycles {
            println!("  {package}: {}", cycle.join(" -> "));
        }
    }
}
