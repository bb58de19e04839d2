//! routescan CLI
//!
//! Command-line interface over the index coordinator: run passes, query
//! the endpoint index, and watch a tree for changes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use routescan_core::{IndexCoordinator, ScanConfig};
use routescan_indexer::{EndpointRecord, FileWatcher, WatcherOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "routescan")]
#[command(about = "routescan - incremental route endpoint indexer")]
#[command(version)]
struct Cli {
    /// Config file path (default: ~/.routescan/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root directories to index (overrides config)
    #[arg(short, long, global = true)]
    root: Vec<PathBuf>,

    /// Workspace scope (overrides config)
    #[arg(short, long, global = true)]
    scope: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full index pass
    Index,

    /// List indexed endpoints
    List {
        /// Only endpoints from this file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Search endpoints by verb, path, handler or file
    Search {
        /// Search term (case-insensitive substring)
        term: String,
    },

    /// Show index statistics
    Stats,

    /// Run a pass, then re-index on file changes until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Index => cmd_index(config).await,
        Commands::List { file } => cmd_list(config, file).await,
        Commands::Search { term } => cmd_search(config, &term).await,
        Commands::Stats => cmd_stats(config).await,
        Commands::Watch => cmd_watch(config).await,
    }
}

fn load_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::load_from(path).context("Failed to load config file")?,
        None => ScanConfig::load(),
    };

    if !cli.root.is_empty() {
        config.roots = cli.root.clone();
    }
    if let Some(scope) = &cli.scope {
        config.scope = scope.clone();
    }

    Ok(config)
}

async fn cmd_index(config: ScanConfig) -> Result<()> {
    let mut coordinator = IndexCoordinator::new(config).await?;

    match coordinator.refresh().await? {
        Some(summary) => {
            println!("Index pass complete.");
            println!("  Processed:  {} files", summary.processed);
            println!("  Skipped:    {} files", summary.skipped);
            println!("  Endpoints:  {} found", summary.endpoints_found);
            println!("  Duration:   {}ms", summary.duration_ms);
        }
        None => {
            println!("A pass is already in progress.");
        }
    }

    coordinator.close().await?;
    Ok(())
}

async fn cmd_list(config: ScanConfig, file: Option<PathBuf>) -> Result<()> {
    let coordinator = IndexCoordinator::new(config).await?;

    let records = match &file {
        Some(path) => {
            let path = path.canonicalize().context("Invalid file path")?;
            coordinator.list_for_file(&path)
        }
        None => coordinator.list_all(),
    };

    if records.is_empty() {
        println!("No endpoints indexed. Run: routescan index");
        return Ok(());
    }

    for record in &records {
        print_endpoint(record);
    }
    println!();
    println!("{} endpoint(s)", records.len());

    Ok(())
}

async fn cmd_search(config: ScanConfig, term: &str) -> Result<()> {
    let coordinator = IndexCoordinator::new(config).await?;

    let records = coordinator.search(term);
    if records.is_empty() {
        println!("No endpoints matching '{}'", term);
        return Ok(());
    }

    for record in &records {
        print_endpoint(record);
    }

    Ok(())
}

async fn cmd_stats(config: ScanConfig) -> Result<()> {
    let coordinator = IndexCoordinator::new(config).await?;

    let stats = coordinator.stats();
    println!("Endpoints:      {}", stats.total_endpoints);
    println!("Tracked files:  {}", stats.total_files);
    println!("Indexed files:  {}", stats.indexed_files);

    Ok(())
}

async fn cmd_watch(config: ScanConfig) -> Result<()> {
    let roots = config.roots.clone();
    let mut coordinator = IndexCoordinator::new(config).await?;

    coordinator.subscribe(|summary| {
        println!(
            "Pass: {} processed, {} skipped, {} endpoints ({}ms)",
            summary.processed, summary.skipped, summary.endpoints_found, summary.duration_ms
        );
    });

    coordinator.refresh().await?;

    let mut watcher = FileWatcher::new(WatcherOptions::default());
    for root in &roots {
        watcher
            .watch(root)
            .with_context(|| format!("Failed to watch {}", root.display()))?;
    }

    println!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            change = watcher.next() => {
                match change {
                    Some(change) => coordinator.handle_change(change).await?,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping.");
                break;
            }
        }
    }

    coordinator.close().await?;
    Ok(())
}

fn print_endpoint(record: &EndpointRecord) {
    println!(
        "{:7} {:32} {} ({}:{})",
        record.method.to_uppercase(),
        record.path,
        record.handler_name,
        record.file_path.display(),
        record.line_number
    );
}
