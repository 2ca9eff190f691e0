//! The operations behind the `login`, `logout` and `status` commands.

use {
    channel_auth_config::ChannelAuthConfig,
    tracing::{debug, info},
};

use crate::{ChannelId, Result, SecretStatus, registry::AuthRegistry, resolver::ChannelResolver};

fn resolver<'r>(registry: &'r AuthRegistry, config: &ChannelAuthConfig) -> ChannelResolver<'r> {
    ChannelResolver::new(registry).with_channel_alias(config.channel_alias())
}

/// Resolve `channel` and run its authenticator's login.
pub fn login(
    registry: &AuthRegistry,
    config: &ChannelAuthConfig,
    channel: &str,
) -> Result<ChannelId> {
    debug!(channel, "login requested");
    let binding = resolver(registry, config).resolve(channel, &config.channel_settings)?;
    let id = binding.login()?;
    info!(channel = %id, "logged in");
    Ok(id)
}

/// Resolve `channel` and remove its stored secret.
pub fn logout(
    registry: &AuthRegistry,
    config: &ChannelAuthConfig,
    channel: &str,
) -> Result<ChannelId> {
    debug!(channel, "logout requested");
    let binding = resolver(registry, config).resolve(channel, &config.channel_settings)?;
    let id = binding.logout()?;
    info!(channel = %id, "logged out");
    Ok(id)
}

/// One row of `status` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatus {
    /// The channel as displayed to the user.
    pub channel: String,
    pub auth_type: Option<String>,
    pub state: ChannelState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Secret(SecretStatus),
    /// The entry is misconfigured; the message explains how.
    Invalid(String),
    /// An earlier entry for the same channel takes precedence.
    Shadowed,
}

/// Report every configured channel.
///
/// Unlike [`login`]/[`logout`] this never aborts on a bad entry; each
/// problem is reported on its own row.
pub fn status(registry: &AuthRegistry, config: &ChannelAuthConfig) -> Vec<ChannelStatus> {
    let resolver = resolver(registry, config);
    let mut seen: Vec<ChannelId> = Vec::new();

    config
        .channel_settings
        .iter()
        .filter_map(|entry| entry.channel().map(|name| (entry, name)))
        .map(|(entry, name)| {
            let auth_type = entry.auth().map(str::to_string);
            let (channel, state) = match resolver.parse_channel(name) {
                Err(e) => (name.to_string(), ChannelState::Invalid(e.to_string())),
                Ok(id) if seen.contains(&id) => (id.to_string(), ChannelState::Shadowed),
                Ok(id) => {
                    let state = match auth_type.as_deref().and_then(|t| registry.get(t)) {
                        None => ChannelState::Invalid(match &auth_type {
                            Some(t) => format!("unknown authentication type \"{t}\""),
                            None => "no \"auth\" configured".to_string(),
                        }),
                        Some(authenticator) => match authenticator.secret_status(&id, entry) {
                            Ok(status) => ChannelState::Secret(status),
                            Err(e) => ChannelState::Invalid(e.to_string()),
                        },
                    };
                    let display = id.to_string();
                    seen.push(id);
                    (display, state)
                },
            };
            ChannelStatus {
                channel,
                auth_type,
                state,
            }
        })
        .collect()
}
