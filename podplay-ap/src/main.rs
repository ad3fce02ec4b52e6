//! podplay audio player service - main entry point
//!
//! Composition root: builds the one playback engine and session store and
//! serves them over HTTP/SSE with a headless clock-driven media handle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use podplay_ap::api::{self, AppContext};
use podplay_ap::catalog::{EpisodeCatalog, TranscriptLinks};
use podplay_ap::media::ClockedHandle;
use podplay_ap::playback::{EngineSettings, PlaybackEngine};
use podplay_ap::transcript::{SyncSettings, TranscriptPanel};
use podplay_ap::SessionStore;
use podplay_common::config::ConfigResolver;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for podplay-ap
#[derive(Parser, Debug)]
#[command(name = "podplay-ap")]
#[command(about = "Podcast playback service with synchronized transcripts")]
#[command(version)]
struct Args {
    /// Bootstrap config file (overrides PODPLAY_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "PODPLAY_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigResolver::new(args.config.clone());
    let mut config = resolver.load().context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    // Initialize tracing
    let default_filter = format!(
        "podplay_ap={level},podplay_common={level},tower_http={level}",
        level = config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting podplay audio player on port {}", config.port);
    match resolver.resolve_path() {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (built-in defaults)"),
    }

    let catalog = Arc::new(
        EpisodeCatalog::load(&config.catalog)
            .await
            .context("Failed to load episode catalog")?,
    );
    info!("Catalog ready: {} episodes", catalog.len());

    let links = Arc::new(TranscriptLinks::from_config(&config.storage));

    // Media handle and engine
    let (media_tx, media_rx) = mpsc::unbounded_channel();
    let handle = ClockedHandle::new(media_tx, Duration::from_millis(config.playback.tick_ms));
    let engine = Arc::new(PlaybackEngine::new(
        Box::new(handle),
        EngineSettings::from_config(&config),
    ));
    tokio::spawn(Arc::clone(&engine).run_media_events(media_rx));
    info!("Playback engine initialized");

    let store = SessionStore::new(engine);
    let (transcript, _) = TranscriptPanel::spawn(SyncSettings::from(&config.transcript), &store);

    let ctx = AppContext {
        store,
        catalog,
        links,
        transcript,
        port: config.port,
    };

    api::run(ctx, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
