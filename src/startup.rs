use crate::assess::{Scorer, ScoringPolicy};
use crate::config::Config;
use crate::envelope::EnvelopeKey;
use crate::reputation::{GsbClient, ReputationConfig};
use crate::secrets::{self, SecretStore};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};

/// Build the secret store.
///
/// If `secrets_file` is provided, secrets resolve from: file -> env.
pub fn build_secret_store(secrets_file: Option<PathBuf>) -> Result<Arc<dyn SecretStore>> {
    let store: Arc<dyn SecretStore> = if let Some(path) = &secrets_file {
        let file_store = secrets::FileStore::load(path)?;
        Arc::new(secrets::LayeredStore::new(vec![
            Box::new(file_store),
            Box::new(secrets::EnvStore),
        ]))
    } else {
        Arc::new(secrets::EnvStore)
    };

    Ok(store)
}

/// Resolve the transport envelope key. The sidecar cannot run without it.
pub fn resolve_envelope_key(store: &Arc<dyn SecretStore>) -> Result<EnvelopeKey> {
    let Some(b64) = store.get(secrets::ENVELOPE_KEY) else {
        anyhow::bail!(
            "transport envelope key missing or empty in secrets store ({})",
            secrets::ENVELOPE_KEY
        );
    };
    EnvelopeKey::from_base64(&b64)
        .with_context(|| format!("invalid {}", secrets::ENVELOPE_KEY))
}

/// Construct the scoring engine from explicit configuration.
///
/// A missing reputation key is a configuration state, not a failure: the
/// engine degrades to heuristics-only scoring.
pub fn build_scorer(config: &Config, api_key: Option<String>) -> Result<Scorer> {
    match &api_key {
        Some(_) => info!(
            "reputation lookups enabled (endpoint={}, timeout={}s)",
            config.reputation.endpoint, config.reputation.timeout_secs
        ),
        None => warn!(
            "no {} configured; scoring falls back to heuristics only",
            secrets::REPUTATION_KEY
        ),
    }

    let reputation_cfg = ReputationConfig {
        endpoint: config.reputation.endpoint.clone(),
        timeout: Duration::from_secs(config.reputation.timeout_secs),
        client_id: config.reputation.client_id.clone(),
        client_version: config.reputation.client_version.clone(),
    };
    let provider = GsbClient::new(reputation_cfg, api_key)?;

    let policy = ScoringPolicy {
        medium_flag_count: config.scoring.medium_flag_count,
    };
    Ok(Scorer::new(Arc::new(provider), policy))
}
