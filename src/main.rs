//! clvseg: customer lifetime value segmentation CLI
//!
//! Loads both activity sources, scores every customer once, then prints
//! statistics and renders charts.

use anyhow::{Context, Result};
use clap::Parser;
use clvseg::{
    correlation_matrix, describe, export_reports, run_analysis, viz, AnalysisSummary, Aggregator,
    Args, TracingObserver, ValueModel,
};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(args.verbose);

    let start_time = Instant::now();

    // Step 1: Load and merge sources
    let aggregator = Aggregator::new(args.aggregator_config());
    let customers = aggregator
        .load_and_aggregate(&args.sources())
        .context("failed to load customer sources")?;

    println!("✓ Data loaded: {} customers", customers.len());

    // Step 2: Score and segment, once per customer
    let model = ValueModel::new(args.thresholds()?);
    let scoring_start = Instant::now();
    let reports = run_analysis(&customers, &model, &mut TracingObserver);
    info!(
        customers = reports.len(),
        elapsed_ms = scoring_start.elapsed().as_millis() as u64,
        "scoring complete"
    );

    viz::print_customer_reports(&reports);

    // Step 3: Statistics
    let summary = AnalysisSummary::from_reports(&reports);
    viz::print_segment_summary(&summary);
    viz::print_summary_statistics(&describe(&reports));
    viz::print_correlation_matrix(&correlation_matrix(&reports));

    if let Some(ref export_path) = args.export {
        export_reports(export_path, &reports)
            .with_context(|| format!("failed to write {}", export_path.display()))?;
        println!("\nResults written to: {}", export_path.display());
    }

    // Step 4: Charts
    if !args.no_charts {
        viz::generate_visualization_report(&reports, &args.output, args.segment)?;
        println!("\n✓ Visualizations generated");
        println!("Scatter plot saved to: {}", args.output);
    }

    println!("\n=== Analysis Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
