//! Tail-Risk Estimation Demo
//!
//! Runs the full pipeline on the default log-normal loss model (or on a JSON
//! configuration) and prints the Markdown report.
//!
//! Usage:
//! ```bash
//! RUST_LOG=info cargo run --example tail_risk --release
//! cargo run --example tail_risk --release -- config.json
//! ```

use anyhow::{Context, Result};
use qare_engine::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => QareConfig::from_json_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => QareConfig::default_tail().with_seed(42),
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          QARE Tail-Risk Estimation - State Vector            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("{}\n", config);

    let mut pipeline = RiskPipeline::new(config);
    let report = pipeline.run().context("running the risk pipeline")?;

    println!("{}", Reporter::report(&report, ReportFormat::Markdown));

    let (lo, hi) = report.quantum.confidence_interval(1.96);
    println!(
        "95% interval [{:.6}, {:.6}] {} the analytic tail {:.6}",
        lo,
        hi,
        if (lo..=hi).contains(&report.analytic_probability) {
            "contains"
        } else {
            "misses"
        },
        report.analytic_probability
    );
    Ok(())
}
