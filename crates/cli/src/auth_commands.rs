use std::sync::Arc;

use {
    anyhow::Result,
    channel_auth_config::ChannelAuthConfig,
    channel_auth_core::{
        AuthRegistry, ChannelState, ChannelStatus, PresetPrompt, SecretStatus, SecretStore,
        TerminalPrompt,
    },
    clap::Args,
};

#[derive(Args)]
pub struct LoginArgs {
    /// Channel name or URL (e.g. "conda-forge").
    pub channel: String,
    /// Username for HTTP Basic channels (skips the prompt).
    #[arg(long)]
    pub username: Option<String>,
    /// Password for HTTP Basic channels (skips the prompt).
    #[arg(long, env = "CHANNEL_AUTH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Token for OAuth2 channels (skips the browser and prompt).
    #[arg(long, env = "CHANNEL_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

pub fn login(config: &ChannelAuthConfig, store: SecretStore, args: LoginArgs) -> Result<()> {
    let prompt = PresetPrompt::new(Arc::new(TerminalPrompt))
        .username(args.username)
        .password(args.password)
        .token(args.token);
    let registry = AuthRegistry::builtin(store, Arc::new(prompt));

    let channel = channel_auth_core::login(&registry, config, &args.channel)?;
    println!("Successfully logged in to {channel}");
    Ok(())
}

pub fn logout(config: &ChannelAuthConfig, store: SecretStore, channel: &str) -> Result<()> {
    let registry = AuthRegistry::builtin(store, Arc::new(TerminalPrompt));

    let channel = channel_auth_core::logout(&registry, config, channel)?;
    println!("Logged out from {channel}");
    Ok(())
}

pub fn status(config: &ChannelAuthConfig, store: SecretStore) -> Result<()> {
    let registry = AuthRegistry::builtin(store, Arc::new(TerminalPrompt));
    let rows = channel_auth_core::status(&registry, config);
    if rows.is_empty() {
        println!("No channels configured in channel_settings.");
        return Ok(());
    }
    for row in &rows {
        println!("{}", status_line(row));
    }
    Ok(())
}

fn status_line(row: &ChannelStatus) -> String {
    let auth = row.auth_type.as_deref().unwrap_or("-");
    let state = match &row.state {
        ChannelState::Secret(SecretStatus::Stored {
            username: Some(username),
        }) => format!("logged in as {username}"),
        ChannelState::Secret(SecretStatus::Stored { username: None }) => "logged in".to_string(),
        ChannelState::Secret(SecretStatus::Missing) => "not logged in".to_string(),
        ChannelState::Secret(SecretStatus::Unknown) => "unknown".to_string(),
        ChannelState::Shadowed => "shadowed by an earlier entry".to_string(),
        ChannelState::Invalid(reason) => format!("invalid: {reason}"),
    };
    format!("{} [{auth}] {state}", row.channel)
}
