//! Configuration discovery, env substitution, and layered merging.
//!
//! Config files: `channel-auth.toml`, `channel-auth.yaml`, `channel-auth.yml`
//! or `channel-auth.json`. Searched in an explicit path, then `./`, then the
//! user config directory (`~/.config/channel-auth/`).
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw file.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{ConfigSources, default_config_dir, load_config, load_layered},
    schema::{ChannelAuthConfig, ChannelSettings, DEFAULT_CHANNEL_ALIAS},
};
