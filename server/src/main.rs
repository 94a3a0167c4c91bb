//! `lookout` binary: load configuration, recover the job store and serve.

use anyhow::Context;
use clap::Parser;
use lookout_core::AppConfig;
use lookout_db::Database;
use lookout_engine::{EngineConfig, JobRunner, ProbeEngine};
use lookout_server::{maintenance, AppState};
use lookout_sites::SiteLoader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "lookout", version, about = "Find accounts registered to an email address")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "LOOKOUT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LOOKOUT_PORT")]
    port: Option<u16>,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    lookout_server::init_tracing(cli.debug);

    let config = load_config(&cli)?;

    let db_path = config.database_path()?;
    let db = Database::open(&db_path)
        .await
        .with_context(|| format!("failed to open job store at {}", db_path.display()))?;

    let store = db.jobs();
    let interrupted = store
        .mark_interrupted()
        .await
        .context("failed to recover interrupted jobs")?;
    if interrupted > 0 {
        tracing::warn!(count = interrupted, "marked jobs from a previous run as failed");
    }

    let loader = match &config.probing.sites_dir {
        Some(dir) => SiteLoader::new(dir.clone())?,
        None => SiteLoader::with_default_dir()?,
    };
    tracing::info!(dir = %loader.definitions_dir().display(), "using site definitions");

    let engine = ProbeEngine::new(EngineConfig::from(&config.probing));
    let mut runner = JobRunner::new(store.clone(), Arc::new(loader), engine);
    if let Some(max) = config.probing.max_concurrent_jobs {
        runner = runner.with_max_concurrent_jobs(max);
    }

    let retention_task = config.storage.retention().map(|retention| {
        tracing::info!(days = ?config.storage.retention_days, "purging finished jobs");
        maintenance::spawn_retention_task(store.clone(), retention, maintenance::PURGE_INTERVAL)
    });

    let app = lookout_server::router(AppState::new(runner));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Lookout listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(task) = retention_task {
        task.abort();
    }
    db.close().await;
    tracing::info!("shut down");

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    config.apply_env();

    if let Some(host) = &cli.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
