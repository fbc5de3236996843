#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use mims_server::config::Args;
use mims_server::{AppState, router};
use mims_storage::{SeedDocument, SqliteStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("mims_server=info,mims_storage=info,tower_http=info")
        }))
        .init();

    let args = Args::parse();

    // Opening once up front runs the schema gate before any request arrives.
    let mut store = SqliteStore::open(&args.storage_dir)
        .with_context(|| format!("open storage at {}", args.storage_dir.display()))?;
    if let Some(seed_path) = &args.seed {
        let seed = SeedDocument::from_path(seed_path)
            .with_context(|| format!("read seed {}", seed_path.display()))?;
        store.apply_seed(&seed)?;
    }
    drop(store);

    let app = router(AppState::new(args.storage_dir.clone()));
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("bind {}", args.bind))?;
    tracing::info!(
        bind = %args.bind,
        storage_dir = %args.storage_dir.display(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl_c handler unavailable");
        std::future::pending::<()>().await;
    }
}
