//! Command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::PipelineStats;
use crate::pipeline::Pipeline;

#[derive(Debug, Parser)]
#[command(name = "reviews_warehouse")]
#[command(about = "Convert a raw product catalog and ratings log into star-schema Parquet tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to the nested product catalog (newline-delimited JSON).
    /// Falls back to INPUT_JSON_PATH.
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog_path: Option<PathBuf>,

    /// Path to the ratings log (headerless CSV).
    /// Falls back to INPUT_CSV_PATH.
    #[arg(long = "ratings", value_name = "PATH")]
    pub ratings_path: Option<PathBuf>,

    /// Output base directory receiving one subdirectory per table.
    /// Falls back to OUTPUT_PATH.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Partition key appended under each table directory (e.g. a batch date).
    /// Falls back to OUTPUT_PARTITION.
    #[arg(short = 'p', long = "partition", value_name = "KEY")]
    pub partition: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress the progress spinner and the run summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Set up structured logging to stderr.
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reviews_warehouse={}", args.log_level())));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Resolve configuration, run the pipeline, and report the outcome.
pub async fn run(args: Args) -> Result<PipelineStats> {
    setup_logging(&args);

    let config = PipelineConfig::resolve(
        args.catalog_path.clone(),
        args.ratings_path.clone(),
        args.output_path.clone(),
        args.partition.clone(),
    )?;
    config.validate()?;

    info!("Catalog input: {}", config.catalog_path.display());
    info!("Ratings input: {}", config.ratings_path.display());
    info!(
        "Output: {} (partition '{}')",
        config.output_path.display(),
        config.partition
    );

    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message("Building warehouse tables...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let pipeline = Pipeline::new(config);
    let result = pipeline.run().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let stats = result?;
    if !args.quiet {
        report(&stats);
    }
    Ok(stats)
}

/// Print the run summary.
fn report(stats: &PipelineStats) {
    println!("\n{}", "Warehouse build complete".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.elapsed.as_millis().to_string().bright_white()
    );
    println!(
        "  {} {} records expanded to {} rows",
        "Catalog:".bright_cyan(),
        stats.catalog_records.to_string().bright_white(),
        stats.catalog_rows.to_string().bright_white()
    );
    println!(
        "  {} {} rows",
        "Ratings:".bright_cyan(),
        stats.rating_rows.to_string().bright_white()
    );
    if stats.malformed_catalog_lines > 0 {
        println!(
            "  {} {}",
            "Malformed catalog lines skipped:".bright_red(),
            stats.malformed_catalog_lines.to_string().bright_red().bold()
        );
    }
    if stats.array_length_mismatches > 0 {
        println!(
            "  {} {}",
            "Array length mismatches:".bright_yellow(),
            stats.array_length_mismatches.to_string().bright_yellow()
        );
    }

    println!("\n{}", "Tables written".bright_green().bold());
    for (table, rows) in stats.table_rows() {
        println!(
            "  {:<14} {} rows",
            format!("{}:", table).bright_cyan(),
            rows.to_string().bright_white().bold()
        );
    }
    println!(
        "\n  {} {}",
        "Output path:".bright_cyan(),
        stats.output_path.display()
    );
}
