use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use prettytable::row;
use prettytable::Table;
use qubo_portfolio::engine::SelectionReport;
use qubo_portfolio::solver::QaoaBackend;
use qubo_portfolio::solver::QaoaConfig;
use qubo_portfolio::universe::JsonStatistics;
use qubo_portfolio::universe::StatisticsProvider;
use qubo_portfolio::AssetUniverse;
use qubo_portfolio::SelectionEngine;
use qubo_portfolio::SelectionEngineConfig;
use qubo_portfolio::SolverKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qubo-portfolio")]
#[command(about = "Pick K assets by minimizing a portfolio QUBO")]
struct Args {
  /// JSON file with `tickers`, `mu` and `sigma`
  #[arg(long, short, conflicts_with = "demo")]
  input: Option<PathBuf>,

  /// Run on the built-in five-asset universe
  #[arg(long)]
  demo: bool,

  /// Number of assets to select
  #[arg(long, short = 'k', default_value_t = 2)]
  cardinality: usize,

  /// Risk weight
  #[arg(long, default_value_t = 1.0)]
  lambda: f64,

  /// Cardinality penalty weight
  #[arg(long, default_value_t = 10.0)]
  gamma: f64,

  /// Solver: exact or variational
  #[arg(long, default_value = "exact")]
  solver: SolverKind,

  /// Variational circuit depth
  #[arg(long, default_value_t = 1)]
  depth: usize,

  /// Measurement shots for the variational backend
  #[arg(long, default_value_t = 1024)]
  shots: usize,

  /// Iteration cap for the variational angle search
  #[arg(long, default_value_t = 300)]
  max_iters: u64,

  /// Seed for the variational backend
  #[arg(long)]
  seed: Option<u64>,

  /// Rescale the QUBO so no entry exceeds this magnitude before solving
  #[arg(long)]
  rescale: Option<f64>,

  /// Print the report as JSON instead of a table
  #[arg(long)]
  json: bool,
}

fn render(report: &SelectionReport) {
  let mut table = Table::new();
  table.add_row(row!["Ticker", "mu", "variance", "x", "selected"]);
  for (i, ticker) in report.tickers.iter().enumerate() {
    let mark = if report.x[i] == 1 { "yes" } else { "" };
    table.add_row(row![
      ticker,
      format!("{:.4}", report.mu[i]),
      format!("{:.4}", report.variances[i]),
      report.x[i],
      mark
    ]);
  }
  table.printstd();

  println!("Solver:             {}", report.solver);
  println!("Selected:           {:?}", report.selected);
  println!("Not selected:       {:?}", report.not_selected);
  println!("Objective (x'Qx):   {:.6}", report.objective);
  println!("Portfolio return:   {:.6}", report.portfolio_return);
  println!("Portfolio variance: {:.6}", report.portfolio_variance);
  if report.scale != 1.0 {
    println!("QUBO scaled by:     1/{:.4}", report.scale);
  }
  if report.cardinality() != report.target_cardinality {
    println!(
      "Picked {} assets, target was {}",
      report.cardinality(),
      report.target_cardinality
    );
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let provider: Box<dyn StatisticsProvider> = match (&args.input, args.demo) {
    (Some(path), _) => Box::new(JsonStatistics::new(path)),
    (None, true) => Box::new(AssetUniverse::demo()),
    (None, false) => bail!("pass --input <file> or --demo"),
  };

  let config = SelectionEngineConfig {
    cardinality: args.cardinality,
    risk_weight: args.lambda,
    penalty_weight: args.gamma,
    solver: args.solver,
    depth: args.depth,
    rescale_max_abs: args.rescale,
  };

  let mut engine = SelectionEngine::new(config);
  if args.solver == SolverKind::Variational {
    engine = engine.with_backend(Arc::new(QaoaBackend::new(QaoaConfig {
      max_iters: args.max_iters,
      shots: args.shots,
      seed: args.seed,
      ..QaoaConfig::default()
    })));
  }

  let report = engine
    .run_with(provider.as_ref())
    .context("portfolio selection failed")?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    render(&report);
  }

  Ok(())
}
