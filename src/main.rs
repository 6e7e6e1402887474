use anyhow::{Context, Result};
use clap::Parser;
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trustid_sidecar::secrets::{self, SecretStore as _};
use trustid_sidecar::{config::Config, routes, startup, state::AppState};

/// TrustID phishing-scoring sidecar.
///
/// Accepts AES-GCM-sealed messages, extracts and scores any embedded URLs,
/// and returns a sealed risk assessment.
#[derive(Debug, Parser)]
#[command(name = "trustid-sidecar")]
#[command(version)]
struct Args {
    /// Path to a TOML config file. Built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a KEY=VALUE secrets file (checked before the environment).
    #[arg(long)]
    secrets_file: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let secret_store = startup::build_secret_store(args.secrets_file)?;
    let envelope_key = startup::resolve_envelope_key(&secret_store)?;

    let api_key = secret_store.get(secrets::REPUTATION_KEY);
    let reputation_configured = api_key.is_some();
    let scorer = startup::build_scorer(&config, api_key)?;

    let bind = config.server.bind.clone();
    let state = Arc::new(AppState {
        scorer,
        envelope_key,
        reputation_configured,
        config,
    });
    let app = routes::router(state);

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!("listening on {bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
