//! Secret resolution for the sidecar's two credentials: the transport
//! envelope key and the optional reputation API key.
//!
//! Secrets resolve through a layered store (file first, then process
//! environment) so deployments can choose either without code changes.

use anyhow::{anyhow, Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Base64-encoded 32-byte AES key for the transport envelope. Required.
pub const ENVELOPE_KEY: &str = "AES_KEY_B64";

/// Safe Browsing API key. Optional; absence disables reputation lookups.
pub const REPUTATION_KEY: &str = "GSB_API_KEY";

pub trait SecretStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment. Empty values count as absent.
pub struct EnvStore;

impl SecretStore for EnvStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// A KEY=VALUE secrets file, e.g. `/etc/trustid/secrets.env`.
///
/// The file and its parent directory must be private (no group/other bits);
/// a world-readable secrets file is a deployment error, not something to
/// work around.
pub struct FileStore {
    map: HashMap<String, String>,
}

impl FileStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_private(&path)?;

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed reading secrets file: {}", path.display()))?;

        let mut map = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // KEY=VALUE only; no quoting or escapes.
            if let Some((k, v)) = line.split_once('=') {
                let (k, v) = (k.trim(), v.trim());
                if !k.is_empty() && !v.is_empty() {
                    map.insert(k.to_string(), v.to_string());
                }
            }
        }

        Ok(Self { map })
    }
}

impl SecretStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned().filter(|v| !v.is_empty())
    }
}

/// First store with a value wins.
pub struct LayeredStore {
    stores: Vec<Box<dyn SecretStore>>,
}

impl LayeredStore {
    pub fn new(stores: Vec<Box<dyn SecretStore>>) -> Self {
        Self { stores }
    }
}

impl SecretStore for LayeredStore {
    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|s| s.get(key))
    }
}

/// Require the secrets file and its parent directory to be inaccessible to
/// group/others (600-ish file inside a 700-ish directory).
fn ensure_private(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("secrets file not found: {}", path.display()));
    }

    #[cfg(unix)]
    {
        let mode = fs::metadata(path)?.mode() & 0o777;
        if (mode & 0o077) != 0 {
            return Err(anyhow!(
                "secrets file permissions too open (need 600-ish): {} has mode {:o}",
                path.display(),
                mode
            ));
        }

        if let Some(parent) = path.parent() {
            let pmode = fs::metadata(parent)?.mode() & 0o777;
            if (pmode & 0o077) != 0 {
                return Err(anyhow!(
                    "secrets dir permissions too open (need 700-ish): {} has mode {:o}",
                    parent.display(),
                    pmode
                ));
            }
        }
    }

    Ok(())
}
