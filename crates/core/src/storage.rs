use std::{
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::{debug, info, warn},
};

use crate::{AuthType, ChannelId, Result, error::Context};

/// File name of the secret store inside the config directory.
pub const SECRETS_FILE: &str = "channel_secrets.json";

/// One stored credential.
#[derive(Serialize, Deserialize)]
pub struct StoredSecret {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(serialize_with = "serialize_secret")]
    pub secret: Secret<String>,
}

impl std::fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSecret")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// File-based secret storage at `<config dir>/channel_secrets.json`.
///
/// Entries are keyed per authentication type and channel, see
/// [`SecretStore::key`]. The file is written with `0600` permissions on Unix.
#[derive(Debug, Clone)]
pub struct SecretStore {
    path: PathBuf,
}

impl SecretStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(SECRETS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Storage key for `channel` under `auth_type`.
    pub fn key(auth_type: AuthType, channel: &ChannelId) -> String {
        format!("channel-auth::{auth_type}::{}", channel.canonical())
    }

    /// Look up `key`. A missing file reads as empty; a corrupt one is an error.
    pub fn load(&self, key: &str) -> Result<Option<StoredSecret>> {
        let path = self.path.display().to_string();
        let Some(mut map) = self.read_map().inspect_err(|e| {
            warn!(path = %path, key, error = %e, "secret file unreadable");
        })?
        else {
            debug!(path = %path, key, "secret file not found");
            return Ok(None);
        };

        let secret = map.remove(key);
        debug!(path = %path, key, found = secret.is_some(), "secret lookup");
        Ok(secret)
    }

    /// Store `secret` under `key`, replacing any previous value.
    pub fn save(&self, key: &str, secret: StoredSecret) -> Result<()> {
        let path = self.path.display().to_string();
        info!(path = %path, key, "saving secret");

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Never overwrite a corrupt file; it may hold other credentials.
        let mut map = self.read_map()?.unwrap_or_default();
        map.insert(key.to_string(), secret);
        self.write_map(&map)?;

        info!(path = %path, key, "secret saved");
        Ok(())
    }

    /// Remove `key`. Returns whether anything was removed; a missing file or
    /// entry is not an error.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path.display().to_string();
        info!(path = %path, key, "deleting secret");

        let Some(mut map) = self.read_map()? else {
            return Ok(false);
        };
        if map.remove(key).is_none() {
            debug!(path = %path, key, "no secret stored");
            return Ok(false);
        }
        self.write_map(&map)?;
        Ok(true)
    }

    pub fn list(&self) -> Vec<String> {
        self.read_map()
            .ok()
            .flatten()
            .map(|m| m.into_keys().collect())
            .unwrap_or_default()
    }

    fn read_map(&self) -> Result<Option<BTreeMap<String, StoredSecret>>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Some(BTreeMap::new()));
        }
        let map = serde_json::from_str(&data)
            .with_context(|| format!("corrupt secret file {}", self.path.display()))?;
        Ok(Some(map))
    }

    fn write_map(&self, map: &BTreeMap<String, StoredSecret>) -> Result<()> {
        let data = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        match std::fs::remove_file(&tmp) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
            _ => {},
        }

        // Created 0600 on Unix, then renamed over the old file in one step.
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
