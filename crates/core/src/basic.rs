//! HTTP Basic credentials: a username plus a password.

use std::sync::Arc;

use {
    channel_auth_config::ChannelSettings,
    secrecy::ExposeSecret,
    tracing::info,
};

use crate::{
    AuthType, Authenticator, ChannelId, Result, SecretStatus,
    prompt::{Field, Prompt},
    storage::{SecretStore, StoredSecret},
};

/// Stores a username and password per channel.
///
/// The username comes from the `username` setting when present, otherwise
/// it is prompted for. The password is always prompted for.
pub struct HttpBasicAuthenticator {
    store: SecretStore,
    prompt: Arc<dyn Prompt>,
}

impl HttpBasicAuthenticator {
    pub fn new(store: SecretStore, prompt: Arc<dyn Prompt>) -> Self {
        Self { store, prompt }
    }
}

impl Authenticator for HttpBasicAuthenticator {
    fn authenticate(&self, channel: &ChannelId, settings: &ChannelSettings) -> Result<()> {
        let username = match settings.get("username").filter(|u| !u.trim().is_empty()) {
            Some(username) => username.trim().to_string(),
            None => self
                .prompt
                .ask(Field::Username, channel)?
                .expose_secret()
                .trim()
                .to_string(),
        };
        let password = self.prompt.ask(Field::Password, channel)?;

        let key = SecretStore::key(AuthType::HttpBasic, channel);
        self.store.save(&key, StoredSecret {
            username: Some(username.clone()),
            secret: password,
        })?;
        info!(%channel, username = %username, "stored basic auth credentials");
        Ok(())
    }

    fn remove_secret(&self, channel: &ChannelId, _settings: &ChannelSettings) -> Result<()> {
        let removed = self
            .store
            .delete(&SecretStore::key(AuthType::HttpBasic, channel))?;
        info!(%channel, removed, "removed basic auth credentials");
        Ok(())
    }

    fn secret_status(
        &self,
        channel: &ChannelId,
        _settings: &ChannelSettings,
    ) -> Result<SecretStatus> {
        let key = SecretStore::key(AuthType::HttpBasic, channel);
        Ok(match self.store.load(&key)? {
            Some(stored) => SecretStatus::Stored {
                username: stored.username,
            },
            None => SecretStatus::Missing,
        })
    }
}
