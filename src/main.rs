use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use matcher_lib::config::ReconcileConfig;
use matcher_lib::matching::manager::Reconciler;
use matcher_lib::models::EntityType;
use matcher_lib::registry::{
    CsvRegistryProvider, HttpRegistryProvider, RegistryCache, RegistryProvider,
};
use matcher_lib::review::{run_review, write_pending, BatchReviewer, Reviewer, TerminalReviewer};
use matcher_lib::tables::{load_input, write_table_to_path};
use matcher_lib::utils::env::load_env;
use matcher_lib::utils::progress_config::ProgressConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Entity type of the input table: company, government or project
    #[arg(long)]
    entity: EntityType,

    /// CSV path, CSV URL or Google Sheets link
    #[arg(long)]
    input: String,

    /// Where to write the reconciled CSV
    #[arg(long)]
    output: PathBuf,

    /// JSON file of pre-approved decisions (skips the interactive review)
    #[arg(long)]
    decisions: Option<PathBuf>,

    /// Write pending decisions to this JSON file and stop before review
    #[arg(long)]
    export_pending: Option<PathBuf>,

    /// Read the registry from a local CSV export instead of the web service
    #[arg(long)]
    registry_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();
    info!("Starting EITI {} reconciliation", args.entity);

    let config = ReconcileConfig::from_env();
    config.log_config();
    let progress = ProgressConfig::from_env();

    let upstream: Arc<dyn RegistryProvider> = match &args.registry_file {
        Some(path) => Arc::new(CsvRegistryProvider::new(path)),
        None => Arc::new(
            HttpRegistryProvider::new(&config).context("Failed to set up registry client")?,
        ),
    };
    let registry = RegistryCache::new(upstream, config.registry_cache_size);

    let client = reqwest::Client::builder()
        .timeout(config.registry_timeout())
        .build()
        .context("Failed to build HTTP client")?;
    let table = load_input(&args.input, &client)
        .await
        .with_context(|| format!("Failed to load input from {}", args.input))?;

    let review_shown = config.review_candidates_shown;
    let reconciler = Reconciler::new(args.entity, &registry, config).with_progress(progress);
    let mut run = reconciler.prepare(table).await?;

    if let Some(path) = &args.export_pending {
        write_pending(path, run.pending())?;
        info!(
            "Stopping before review: {} pending decisions exported",
            run.pending().len()
        );
        run.stats().log_summary();
        return Ok(());
    }

    if run.needs_review() {
        let mut reviewer: Box<dyn Reviewer> = match &args.decisions {
            Some(path) => Box::new(BatchReviewer::from_path(path)?),
            None => Box::new(TerminalReviewer::stdio(review_shown)),
        };
        run_review(run.session_mut(), reviewer.as_mut())?;
    }

    let output = run.finish()?;
    write_table_to_path(&output.table, &args.output)?;
    info!(
        "Wrote {} rows to {}",
        output.table.len(),
        args.output.display()
    );

    let cache_stats = registry.stats().await;
    info!(
        "Registry cache: {} hits, {} misses",
        cache_stats.hits, cache_stats.misses
    );
    output.stats.log_summary();
    Ok(())
}
