use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use coderank::adapters::json::JsonModelSource;
use coderank::app::engine::{AnalysisConfig, MetricsEngine};
use coderank::cli;
use coderank::domain::ports::ModelSource;
use coderank::domain::strategy::StrategyKind;

/// Derive CodeRank and package coupling metrics from a resolved source model.
#[derive(Parser)]
#[command(name = "coderank", version)]
struct Args {
    /// Path to the resolved source model (JSON)
    model: PathBuf,

    /// Extraction strategies feeding the dependency graph
    #[arg(
        long = "coderank-mode",
        value_delimiter = ',',
        default_value = "inheritance,method,property"
    )]
    coderank_mode: Vec<String>,

    /// Emit the full report as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Number of rank table rows per scope
    #[arg(long, default_value_t = 25)]
    top: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let strategies = args
        .coderank_mode
        .iter()
        .map(|s| s.parse::<StrategyKind>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!(e))?;

    let model = JsonModelSource::new(&args.model).load()?;
    let config = AnalysisConfig { strategies };
    let engine = MetricsEngine::analyze(&model, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&engine.report())?);
    } else {
        cli::display_ranks(&engine, args.top);
        cli::display_coupling(&engine);
    }

    Ok(())
}
