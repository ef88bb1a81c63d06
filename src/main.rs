mod cache;
mod config;
mod dataset;
mod fetch;
mod scraper;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use config::Config;

#[derive(Parser)]
#[command(
    name = "evowow_names",
    about = "Builds the GS checker's item-name cache from evowow item pages"
)]
struct Cli {
    /// Dataset file holding the item id universe
    #[arg(long, default_value = "GS.json")]
    dataset: PathBuf,
    /// Cache JSON file (read at startup, rewritten at checkpoints)
    #[arg(long, default_value = "item_names_cache.json")]
    cache: PathBuf,
    /// Browser-script file embedding the same mapping
    #[arg(long, default_value = "item-names.js")]
    js: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch names for ids missing from the cache
    Run {
        /// Max missing ids to attempt this run (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show id/cache counts without fetching
    Stats,
    /// List the ids extracted from the dataset
    Ids,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let cfg = Config {
        dataset_path: cli.dataset,
        cache_json_path: cli.cache,
        cache_js_path: cli.js,
        ..Config::default()
    };

    let result = match cli.command {
        Commands::Run { limit } => run(&cfg, limit).await,
        Commands::Stats => {
            let ids = dataset::extract_ids(&cfg.dataset_path)?;
            let cache = cache::load(&cfg.cache_json_path);
            let missing = cache::missing_ids(&ids, &cache);
            println!("Total:   {}", ids.len());
            println!("Cached:  {}", cache.len());
            println!("Missing: {}", missing.len());
            Ok(())
        }
        Commands::Ids => {
            let ids = dataset::extract_ids(&cfg.dataset_path)?;
            for id in &ids {
                println!("{}", id);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Full pipeline: extract ids, load the cache, diff, resolve the
/// missing ids sequentially, final flush.
async fn run(cfg: &Config, limit: Option<usize>) -> anyhow::Result<()> {
    let ids = dataset::extract_ids(&cfg.dataset_path)?;
    let mut cache = cache::load(&cfg.cache_json_path);
    let mut missing = cache::missing_ids(&ids, &cache);
    println!(
        "Total IDs: {} | cached: {} | missing: {}",
        ids.len(),
        cache.len(),
        missing.len()
    );

    if let Some(n) = limit {
        missing.truncate(n);
    }

    let client = fetch::client(cfg)?;
    let stats = scraper::resolve_missing(&mut cache, &missing, cfg, |id| {
        fetch::fetch_name(&client, cfg.item_url(&id))
    })
    .await?;

    if stats.processed > 0 {
        println!(
            "Cache final: {} ({} resolved, {} failed)",
            cache.len(),
            stats.resolved,
            stats.failed
        );
    } else {
        println!("Cache final: {}", cache.len());
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
