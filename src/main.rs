use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use collab_role_analyzer::config::{Config, EndpointKey};
use collab_role_analyzer::{data, pipeline, storage};

#[derive(Parser, Debug)]
#[clap(
    name = "collab-role-analyzer",
    about = "Developer role classification and community characterization of a collaboration network"
)]
struct Cli {
    /// Directory holding centrality_metrics.csv, community_assignments.csv and bridging_developers.csv
    #[clap(long, default_value = "output")]
    metrics_dir: PathBuf,

    /// Path to the interaction log CSV
    #[clap(long, default_value = "data/interactions.csv")]
    interactions: PathBuf,

    /// Output directory for result tables
    #[clap(long, default_value = "output/tables")]
    output_dir: PathBuf,

    /// Vertex attribute the interaction log uses for Source and Target
    #[clap(long, value_enum, default_value = "label")]
    endpoint_key: EndpointKey,

    /// Number of developers kept in the activity ranking
    #[clap(long, default_value = "30")]
    top_activity: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = Config {
        endpoint_key: args.endpoint_key,
        activity_top_n: args.top_activity,
        ..Config::new(args.metrics_dir, args.interactions, args.output_dir)
    };

    log::info!("Starting collaboration network analysis");
    log::info!("Metrics: {}", config.metrics_dir.display());
    log::info!("Interactions: {}", config.interactions_path.display());
    log::info!("Output: {}", config.output_dir.display());

    // 1. Load data
    let snapshot = data::loader::load_snapshot(&config)?;

    // 2. Classify roles and characterize communities
    let output = pipeline::analyze(&snapshot, &config)?;

    // 3. Save results
    storage::save_results(&output, &config.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", config.output_dir.display());

    Ok(())
}
