//! Radar rain monitor service.
//!
//! Every tick it downloads the current radar composite, checks each watched
//! point for rain, stores an annotated image and publishes the raining points
//! over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::sync::broadcast;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use rain_watch::config::ServiceConfig;
use rain_watch::cycle::{CycleSettings, RefreshCycle, TickOutcome};
use rain_watch::fetch::HttpRasterSource;
use rain_watch::janitor::Janitor;
use rain_watch::points::load_points;
use rain_watch::server::{self, ServerState};
use rain_watch::state::SnapshotStore;
use rain_watch::store::{ArtifactStore, FsArtifactStore};

#[derive(Parser, Debug)]
#[command(name = "rain-watch")]
#[command(about = "Checks watched places for rain on the radar composite")]
struct Args {
    /// Configuration file
    #[arg(long, env = "RAIN_WATCH_CONFIG", default_value = "config/rain-watch.yaml")]
    config: PathBuf,

    /// Points file (overrides points.path from the config)
    #[arg(long, env = "RAIN_WATCH_POINTS")]
    points: Option<PathBuf>,

    /// Address for the HTTP publisher
    #[arg(long, env = "RAIN_WATCH_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting rain-watch");

    let mut config = ServiceConfig::load(&args.config)?;
    if let Some(points) = &args.points {
        config.points.path = points.clone();
    }

    let prometheus = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Failed to install metrics recorder, /metrics disabled");
            None
        }
    };

    let points = load_points(&config.points.path, config.points.delimiter)
        .with_context(|| format!("Failed to load points from {}", config.points.path.display()))?;
    info!(count = points.len(), "Loaded points");

    let artifacts: Arc<dyn ArtifactStore> = Arc::new(
        FsArtifactStore::open(&config.artifacts.dir, config.artifacts.prefix.clone())
            .await
            .context("Failed to open artifact store")?,
    );

    let source = Arc::new(
        HttpRasterSource::new(config.source.url_template.clone(), config.fetch_timeout())
            .context("Failed to create raster source")?,
    );

    let snapshots = Arc::new(SnapshotStore::new());
    let janitor = Janitor::new(artifacts.clone(), config.retention());

    let cycle = RefreshCycle::new(
        CycleSettings {
            bounds: config.bounds,
            bucket_minutes: config.schedule.bucket_minutes,
            interval: config.interval(),
        },
        points,
        source,
        artifacts,
        janitor,
        snapshots.clone(),
    );

    if args.once {
        info!("Running single refresh tick");
        match cycle.tick().await? {
            TickOutcome::Skipped { bucket } => {
                info!(bucket = %bucket, "Bucket already processed");
            }
            TickOutcome::Published { bucket, report, persisted } => {
                info!(
                    bucket = %bucket,
                    raining = report.raining.len(),
                    checked = report.checked(),
                    persisted = persisted,
                    "Tick complete"
                );
            }
        }
        return Ok(());
    }

    // Shutdown signal
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let server_state = Arc::new(ServerState {
        snapshots,
        prometheus,
    });
    let server_shutdown = shutdown_tx.subscribe();
    let listen = args.listen;
    let server_task = tokio::spawn(async move {
        if let Err(e) = server::run_server(server_state, listen, server_shutdown).await {
            error!(error = %e, "Publisher failed");
        }
    });

    // Handle Ctrl+C
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx_clone.send(()).ok();
    });

    cycle.run_forever(shutdown_tx.subscribe()).await;
    server_task.await.ok();

    info!("rain-watch stopped");
    Ok(())
}
