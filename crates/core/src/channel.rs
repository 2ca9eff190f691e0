//! Normalized channel identity.

use std::{
    fmt,
    hash::{Hash, Hasher},
    path::Path,
};

use url::Url;

use crate::error::ResolveError;

/// Platform subdirectories a channel URL may point into.
const PLATFORM_SUBDIRS: &[&str] = &[
    "noarch",
    "emscripten-wasm32",
    "wasi-wasm32",
    "freebsd-64",
    "linux-32",
    "linux-64",
    "linux-aarch64",
    "linux-armv6l",
    "linux-armv7l",
    "linux-ppc64",
    "linux-ppc64le",
    "linux-riscv64",
    "linux-s390x",
    "osx-64",
    "osx-arm64",
    "win-32",
    "win-64",
    "win-arm64",
    "zos-z",
];

/// A channel reduced to a canonical URL.
///
/// `conda-forge`, `https://conda.anaconda.org/conda-forge/` and
/// `https://user:pw@CONDA.anaconda.org/t/tk-123/conda-forge/linux-64` all
/// compare equal. Equality and hashing only look at the canonical URL.
#[derive(Debug, Clone)]
pub struct ChannelId {
    canonical: String,
    /// Path below the channel alias, when the channel lives there.
    name: Option<String>,
}

impl ChannelId {
    /// Normalize `raw`, resolving bare names against `channel_alias`.
    pub fn parse(raw: &str, channel_alias: &str) -> Result<Self, ResolveError> {
        let value = raw.trim();
        if value.trim_matches('/').is_empty() {
            return Err(invalid(raw, "channel is empty"));
        }

        let alias = canonical_url(strip_token(alias_url(channel_alias)?));
        let url = if value.contains("://") {
            strip_token(Url::parse(value).map_err(|e| invalid(raw, e))?)
        } else if Path::new(value).is_absolute() {
            Url::from_file_path(value).map_err(|()| invalid(raw, "not a valid file path"))?
        } else {
            let base = Url::parse(&format!("{alias}/")).map_err(|e| invalid(channel_alias, e))?;
            base.join(value.trim_matches('/'))
                .map_err(|e| invalid(raw, e))?
        };
        if url.cannot_be_a_base() {
            return Err(invalid(raw, "not a hierarchical URL"));
        }

        let canonical = canonical_url(url);
        let name = canonical
            .strip_prefix(&alias)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
            .map(str::to_string);

        Ok(Self { canonical, name })
    }

    /// Canonical URL without a trailing slash.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Name relative to the channel alias (`conda-forge`), if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl PartialEq for ChannelId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ChannelId {}

impl Hash for ChannelId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or(&self.canonical))
    }
}

fn invalid(value: &str, reason: impl fmt::Display) -> ResolveError {
    ResolveError::InvalidChannel {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn alias_url(channel_alias: &str) -> Result<Url, ResolveError> {
    let url = Url::parse(channel_alias.trim()).map_err(|e| invalid(channel_alias, e))?;
    if url.cannot_be_a_base() {
        return Err(invalid(channel_alias, "channel alias must be a hierarchical URL"));
    }
    Ok(url)
}

/// Drop a leading `/t/<token>` from a URL's path. Only applied to values
/// given as URLs; a bare name like `t/alpha` is a channel path.
fn strip_token(mut url: Url) -> Url {
    let rest = url.path_segments().and_then(|mut segments| {
        (segments.next() == Some("t") && segments.next().is_some_and(|tk| !tk.is_empty()))
            .then(|| segments.collect::<Vec<_>>().join("/"))
    });
    if let Some(rest) = rest {
        url.set_path(&format!("/{rest}"));
    }
    url
}

/// Strip credentials, query, fragment and platform subdir, then render
/// without a trailing slash. `Url` already lowercases scheme and host.
fn canonical_url(mut url: Url) -> String {
    // Both fail only for URLs without a host (file://), which carry no credentials.
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.set_query(None);
    url.set_fragment(None);

    let mut segments: Vec<String> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();
    if segments
        .last()
        .is_some_and(|s| PLATFORM_SUBDIRS.contains(&s.as_str()))
    {
        segments.pop();
    }
    url.set_path(&format!("/{}", segments.join("/")));

    url.as_str().trim_end_matches('/').to_string()
}
