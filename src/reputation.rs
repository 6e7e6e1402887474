use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://safebrowsing.googleapis.com/v4/threatMatches:find";
pub const DEFAULT_TIMEOUT_SECS: u64 = 6;

const THREAT_TYPES: &[&str] = &[
    "MALWARE",
    "SOCIAL_ENGINEERING",
    "UNWANTED_SOFTWARE",
    "POTENTIALLY_HARMFUL_APPLICATION",
    "THREAT_TYPE_UNSPECIFIED",
];
const PLATFORM_TYPES: &[&str] = &["ANY_PLATFORM"];
const THREAT_ENTRY_TYPES: &[&str] = &["URL"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientInfo<'a> {
    client_id: &'a str,
    client_version: &'a str,
}

#[derive(Debug, Serialize)]
struct ThreatEntry<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreatInfo<'a> {
    threat_types: &'static [&'static str],
    platform_types: &'static [&'static str],
    threat_entry_types: &'static [&'static str],
    threat_entries: Vec<ThreatEntry<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindThreatMatchesRequest<'a> {
    client: ClientInfo<'a>,
    threat_info: ThreatInfo<'a>,
}

impl<'a> FindThreatMatchesRequest<'a> {
    fn for_urls(cfg: &'a ReputationConfig, urls: &'a [String]) -> Self {
        Self {
            client: ClientInfo {
                client_id: &cfg.client_id,
                client_version: &cfg.client_version,
            },
            threat_info: ThreatInfo {
                threat_types: THREAT_TYPES,
                platform_types: PLATFORM_TYPES,
                threat_entry_types: THREAT_ENTRY_TYPES,
                threat_entries: urls.iter().map(|u| ThreatEntry { url: u }).collect(),
            },
        }
    }
}

// Provider responses are parsed tolerantly: unknown fields are ignored and
// every field we read is optional.
#[derive(Debug, Default, Deserialize)]
struct FindThreatMatchesResponse {
    #[serde(default)]
    matches: Vec<ThreatMatch>,
}

#[derive(Debug, Deserialize)]
struct ThreatMatch {
    #[serde(default)]
    threat: Option<ThreatUrl>,
    #[serde(default, rename = "threatType")]
    threat_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreatUrl {
    #[serde(default)]
    url: Option<String>,
}

/// Outcome of one reputation lookup.
///
/// `supported == false` means no provider was consulted (no key configured,
/// or nothing to ask about) and is not an error. A configured provider that
/// fails comes back as `supported == true` with `error` set and an empty
/// match map, so callers can tell the two states apart.
#[derive(Debug, Clone, Default)]
pub struct ReputationLookup {
    pub supported: bool,
    pub matches: HashMap<String, Vec<String>>,
    pub error: Option<String>,
}

impl ReputationLookup {
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// Total number of threat-type tags across all matched URLs.
    pub fn hit_count(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }
}

/// Seam for the external threat-intelligence provider.
#[async_trait]
pub trait ReputationProvider: Send + Sync {
    async fn lookup(&self, urls: &[String]) -> ReputationLookup;
}

#[derive(Debug, Clone)]
pub struct ReputationConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub client_id: String,
    pub client_version: String,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            client_id: "trustid-sidecar".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Google Safe Browsing v4 `threatMatches:find` client.
///
/// One batched POST per lookup, bounded by the configured timeout. No
/// retries, no caching; every scoring call re-queries.
pub struct GsbClient {
    http: reqwest::Client,
    cfg: ReputationConfig,
    api_key: Option<String>,
}

impl GsbClient {
    /// The API key is resolved by the caller at startup; `None` disables
    /// lookups without being an error.
    pub fn new(cfg: ReputationConfig, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .context("build reputation http client")?;
        Ok(Self { http, cfg, api_key })
    }

    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn find_matches(&self, key: &str, urls: &[String]) -> reqwest::Result<HashMap<String, Vec<String>>> {
        let body = FindThreatMatchesRequest::for_urls(&self.cfg, urls);
        let endpoint = format!("{}?key={}", self.cfg.endpoint, key);
        let resp = self
            .http
            .post(&endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: FindThreatMatchesResponse = resp.json().await?;
        Ok(collect_matches(parsed))
    }
}

#[async_trait]
impl ReputationProvider for GsbClient {
    async fn lookup(&self, urls: &[String]) -> ReputationLookup {
        let Some(key) = self.api_key.as_deref() else {
            return ReputationLookup::unsupported();
        };
        if urls.is_empty() {
            // Nothing to ask about; skip the network round-trip entirely.
            return ReputationLookup::unsupported();
        }

        match self.find_matches(key, urls).await {
            Ok(matches) => ReputationLookup {
                supported: true,
                matches,
                error: None,
            },
            Err(e) => ReputationLookup {
                supported: true,
                matches: HashMap::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

fn collect_matches(resp: FindThreatMatchesResponse) -> HashMap<String, Vec<String>> {
    let mut by_url: HashMap<String, Vec<String>> = HashMap::new();
    for m in resp.matches {
        let Some(url) = m.threat.and_then(|t| t.url) else {
            continue;
        };
        if let Some(tag) = m.threat_type {
            by_url.entry(url).or_default().push(tag);
        }
    }
    by_url
}
