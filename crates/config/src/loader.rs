use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::ChannelAuthConfig,
};

/// Standard config file names, checked in order within a directory.
pub const CONFIG_FILENAMES: &[&str] = &[
    "channel-auth.toml",
    "channel-auth.yaml",
    "channel-auth.yml",
    "channel-auth.json",
];

/// Where configuration layers come from, highest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// A file named on the command line or via `CHANNEL_AUTH_CONFIG`. Must exist.
    pub explicit: Option<PathBuf>,
    /// Project-local directory, normally the working directory.
    pub project_dir: Option<PathBuf>,
    /// User-global directory (`~/.config/channel-auth/`).
    pub config_dir: Option<PathBuf>,
}

impl ConfigSources {
    /// Standard sources: the working directory and the user config directory,
    /// with optional overrides for the explicit file and the config directory.
    pub fn discover(explicit: Option<PathBuf>, config_dir: Option<PathBuf>) -> Self {
        Self {
            explicit,
            project_dir: std::env::current_dir().ok(),
            config_dir: config_dir.or_else(default_config_dir),
        }
    }

    /// Files to load, highest precedence first.
    ///
    /// The explicit file is always listed; each directory contributes the
    /// first of [`CONFIG_FILENAMES`] that exists. A directory reached twice
    /// (project dir equal to the config dir) is only read once.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.explicit.iter().cloned().collect();
        let mut seen_dirs: Vec<PathBuf> = Vec::new();

        for dir in [&self.project_dir, &self.config_dir].into_iter().flatten() {
            let key = dir.canonicalize().unwrap_or_else(|_| dir.clone());
            if seen_dirs.contains(&key) {
                continue;
            }
            seen_dirs.push(key);

            if let Some(path) = find_in_dir(dir)
                && !files.contains(&path)
            {
                files.push(path);
            }
        }
        files
    }
}

/// Returns the user-global config directory (`~/.config/channel-auth/`).
pub fn default_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "channel-auth").map(|d| d.config_dir().to_path_buf())
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Load a single config file (any supported format).
pub fn load_config(path: &Path) -> Result<ChannelAuthConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Load every layer in `sources` and merge them.
///
/// `channel_settings` are concatenated in precedence order, so a channel
/// defined in a higher layer shadows the same channel further down. Returns
/// an empty config when no file exists.
pub fn load_layered(sources: &ConfigSources) -> Result<ChannelAuthConfig> {
    let mut merged = ChannelAuthConfig::default();
    for path in sources.files() {
        let layer = load_config(&path)?;
        debug!(
            path = %path.display(),
            entries = layer.channel_settings.len(),
            "loaded config layer"
        );
        merged.merge_lower(layer);
    }
    if merged.channel_settings.is_empty() {
        debug!("no channel_settings configured");
    }
    Ok(merged)
}

fn parse_config(raw: &str, path: &Path) -> Result<ChannelAuthConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => {
            // An empty YAML document means "no settings", not a parse error.
            if raw.trim().is_empty() {
                return Ok(ChannelAuthConfig::default());
            }
            serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e))
        },
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}
