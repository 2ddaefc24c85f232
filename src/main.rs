use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fts5_index::api::{self, page::PageTemplate};
use fts5_index::cli::Cli;
use fts5_index::config::{self, AppConfig};
use fts5_index::indexer;
use fts5_index::search::DbIndex;
use fts5_index::state::AppState;

fn init_tracing(verbose: bool, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else if verbose {
        "fts5_index=debug,tower_http=debug"
    } else {
        "fts5_index=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration, then apply flags / 加载配置并应用命令行参数
    let mut app_config = match &cli.config {
        Some(path) => config::load_config(path).map_err(anyhow::Error::msg)?,
        None => AppConfig::default(),
    };
    cli.apply_to(&mut app_config).map_err(anyhow::Error::msg)?;

    init_tracing(app_config.verbose, cli.quiet);
    if let Some(path) = &cli.config {
        tracing::info!("Using configuration file {:?}", path);
    }

    if !app_config.should_index() && !app_config.should_serve() {
        tracing::warn!("Nothing to do: pass --html, --site, --serve or --template");
        return Ok(());
    }

    let db_file = &app_config.database.db_file;
    let index = DbIndex::open(db_file)
        .await
        .with_context(|| format!("Failed to open index database {:?}", db_file))?;
    index.init().await.context("Failed to create index tables")?;
    if cli.rebuild {
        tracing::info!("Dropping existing index");
        index.reset_tables().await.context("Failed to reset index tables")?;
    }

    if app_config.should_index() {
        let reports = indexer::run(&index, &app_config.index)
            .await
            .context("Indexing failed")?;
        let total: usize = reports.iter().map(|r| r.documents).sum();
        tracing::info!("Indexing finished, {} documents written", total);
    }

    if !app_config.should_serve() {
        index.close().await;
        return Ok(());
    }

    let page = match &app_config.web.template {
        Some(path) => PageTemplate::load(path)
            .with_context(|| format!("Could not load template {:?}", path))?,
        None => PageTemplate::default(),
    };

    let state = Arc::new(AppState::new(index, page, app_config.web.max_results));
    let app = api::router(state.clone());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Server running at http://{}/search", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.index.close().await;
    Ok(())
}
