/// Config schema types (channel alias and per-channel settings).
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Base URL that bare channel names are resolved against.
pub const DEFAULT_CHANNEL_ALIAS: &str = "https://conda.anaconda.org";

/// One `channel_settings` entry.
///
/// A flat string map: `channel` names the channel, `auth` names the
/// authentication type, every other key belongs to the authenticator.
/// Scalar values (numbers, booleans) are stored as their string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, serde_json::Value>")]
pub struct ChannelSettings(BTreeMap<String, String>);

impl ChannelSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `channel` value, if present and not empty.
    pub fn channel(&self) -> Option<&str> {
        self.get("channel").filter(|c| !c.is_empty())
    }

    /// The `auth` value, if present and not blank.
    pub fn auth(&self) -> Option<&str> {
        self.get("auth").filter(|a| !a.trim().is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ChannelSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl TryFrom<BTreeMap<String, serde_json::Value>> for ChannelSettings {
    type Error = String;

    fn try_from(raw: BTreeMap<String, serde_json::Value>) -> Result<Self, Self::Error> {
        let mut map = BTreeMap::new();
        for (key, value) in raw {
            let value = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s,
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(format!(
                        "channel_settings value for \"{key}\" must be a string, got {other}"
                    ));
                },
            };
            map.insert(key, value);
        }
        Ok(Self(map))
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelAuthConfig {
    /// Overrides [`DEFAULT_CHANNEL_ALIAS`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_alias: Option<String>,
    /// Ordered settings; earlier entries take precedence.
    pub channel_settings: Vec<ChannelSettings>,
}

impl ChannelAuthConfig {
    pub fn channel_alias(&self) -> &str {
        self.channel_alias
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(DEFAULT_CHANNEL_ALIAS)
    }

    /// Fold a lower-precedence layer underneath this one.
    ///
    /// Settings from `lower` are appended so entries already present keep
    /// winning the first-match scan; `channel_alias` is only filled if unset.
    pub fn merge_lower(&mut self, lower: ChannelAuthConfig) {
        if self.channel_alias.is_none() {
            self.channel_alias = lower.channel_alias;
        }
        self.channel_settings.extend(lower.channel_settings);
    }
}
