use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nzbindex_core::{NzbIndexProvider, SceneTokens, ShutdownSignal};
use nzbindex_poller::{Poller, PollerConfig};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "nzbindex-poller", about = "Scheduled NZBIndex search poller")]
struct Args {
    /// TOML configuration file
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run a single cycle, print its report as JSON and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PollerConfig::load(path)?,
        None => PollerConfig::default(),
    };
    if config.watchlist.is_empty() {
        warn!("Watchlist is empty; only propers and the cache will be polled");
    }

    let (shutdown_tx, shutdown) = ShutdownSignal::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    let provider = NzbIndexProvider::with_config(config.provider.clone())
        .context("Failed to build HTTP client")?
        .with_shutdown(shutdown.clone());

    let mut poller = Poller::new(Box::new(SceneTokens), config.watchlist.clone())
        .with_propers(config.propers)
        .with_shutdown(shutdown);
    poller.add_provider(provider);

    if args.once {
        let report = poller.run_cycle().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    poller
        .run(Duration::from_secs(config.poll_interval_secs))
        .await;
    Ok(())
}
