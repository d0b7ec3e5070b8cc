use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pitchcoach::analysis::{AnalysisOrchestrator, LlmReportSynthesizer, ReportSynthesizer};
use pitchcoach::{create_router, AppState, CallSessionStore, Config};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "pitchcoach", about = "Sales call practice coaching service")]
struct Cli {
    /// Configuration file path, without extension
    #[arg(long, default_value = "config/pitchcoach")]
    config: String,

    /// Override the configured bind address, e.g. "0.0.0.0:8080"
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let store = Arc::new(CallSessionStore::new());
    let synthesizer: Arc<dyn ReportSynthesizer> = Arc::new(
        LlmReportSynthesizer::new(&cfg.llm).context("failed to configure report synthesizer")?,
    );
    info!(
        "report synthesizer: {} ({}, timeout {}s)",
        synthesizer.name(),
        cfg.llm.model,
        cfg.llm.timeout_secs
    );

    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        Arc::clone(&store),
        synthesizer,
        Duration::from_secs(cfg.llm.timeout_secs),
    ));
    let state = AppState::new(store, orchestrator);

    let addr = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", cfg.service.http.bind, cfg.service.http.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("HTTP server listening on {addr}");

    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
