//! Habit server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) and `HABIT_*`
//! environment variables, connects the queue and the snapshot archive, and
//! serves the event API over HTTP until interrupted.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use habit_core::{archive::ObjectStore, queue::EventQueue};
use habit_queue::{MemoryQueue, RedisQueue};
use habit_server::{AppState, ServerConfig};
use habit_sync::archive::{DirObjectStore, HttpObjectStore};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Habit event buffer and sync server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("HABIT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.validate().context("invalid configuration")?;

  match server_cfg.redis_url.clone() {
    Some(url) => {
      let queue = RedisQueue::connect(&url)
        .await
        .context("failed to connect to redis")?;
      with_archive(server_cfg, queue).await
    }
    None => {
      tracing::warn!("no redis_url configured; buffering events in memory");
      with_archive(server_cfg, MemoryQueue::new()).await
    }
  }
}

async fn with_archive<Q>(server_cfg: ServerConfig, queue: Q) -> anyhow::Result<()>
where
  Q: EventQueue + 'static,
{
  match server_cfg.archive_endpoint.clone() {
    Some(endpoint) => {
      tracing::info!(%endpoint, "archiving snapshots over http");
      let objects = HttpObjectStore::new(endpoint).context("failed to build http client")?;
      serve(server_cfg, queue, objects).await
    }
    None => {
      tracing::info!(dir = %server_cfg.archive_dir.display(), "archiving snapshots to directory");
      let objects = DirObjectStore::new(server_cfg.archive_dir.clone());
      serve(server_cfg, queue, objects).await
    }
  }
}

async fn serve<Q, O>(server_cfg: ServerConfig, queue: Q, objects: O) -> anyhow::Result<()>
where
  Q: EventQueue + 'static,
  O: ObjectStore + 'static,
{
  let state = AppState::new(Arc::new(queue), Arc::new(objects), server_cfg.sync_config());
  let app = habit_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shutdown complete");
  Ok(())
}

/// Resolve on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl+c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
    _ = terminate => tracing::info!("received SIGTERM, shutting down"),
  }
}
