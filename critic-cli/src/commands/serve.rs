//! Serve command - Run the HTTP API and the worker pool

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use critic_api::AppState;
use critic_core::{Config, DispatchSettings, Dispatcher, Secrets, Stores};
use critic_db::Database;
use tracing::info;

use super::build_analyzer;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (e.g. 127.0.0.1:8000)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Number of analysis workers
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// SQLite database file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Keep tasks, results and cache in memory only
    #[arg(long, conflicts_with = "database")]
    pub in_memory: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let addr: SocketAddr = config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

        let secrets = Secrets::load()?;

        let stores = if self.in_memory {
            info!("Using in-memory stores");
            Stores::in_memory()
        } else {
            let path = config.database.resolved_path();
            let db = Database::new(&path)
                .await
                .with_context(|| format!("Failed to open database at {}", path.display()))?;
            Stores::shared(Arc::new(db))
        };

        let dispatcher = Dispatcher::start(
            build_analyzer(config, &secrets),
            stores,
            DispatchSettings::from_config(config),
        )
        .await;

        critic_api::serve(AppState::new(dispatcher.clone()), addr, shutdown_signal()).await?;

        dispatcher.shutdown().await;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
