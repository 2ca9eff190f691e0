//! Browser login that ends with the user pasting an access token.

use std::sync::Arc;

use {
    channel_auth_config::ChannelSettings,
    tracing::info,
    url::Url,
};

use crate::{
    AuthType, Authenticator, ChannelId, Error, Result, SecretStatus,
    prompt::{Field, Prompt},
    storage::{SecretStore, StoredSecret},
};

/// Setting naming the page that hands out tokens.
pub const LOGIN_URL_KEY: &str = "login_url";

/// Sends the user to the channel's `login_url` and stores the token they
/// paste back.
pub struct OAuth2Authenticator {
    store: SecretStore,
    prompt: Arc<dyn Prompt>,
}

impl OAuth2Authenticator {
    pub fn new(store: SecretStore, prompt: Arc<dyn Prompt>) -> Self {
        Self { store, prompt }
    }

    fn login_url(channel: &ChannelId, settings: &ChannelSettings) -> Result<Url> {
        let raw = settings
            .get(LOGIN_URL_KEY)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::MissingSetting {
                channel: channel.to_string(),
                key: LOGIN_URL_KEY,
                auth_type: AuthType::OAuth2,
            })?;
        Url::parse(raw.trim()).map_err(|e| {
            Error::message(format!(
                "invalid {LOGIN_URL_KEY} \"{raw}\" for channel \"{channel}\": {e}"
            ))
        })
    }
}

impl Authenticator for OAuth2Authenticator {
    fn authenticate(&self, channel: &ChannelId, settings: &ChannelSettings) -> Result<()> {
        let login_url = Self::login_url(channel, settings)?;

        self.prompt.show_url(login_url.as_str(), channel)?;
        let token = self.prompt.ask(Field::Token, channel)?;

        self.store
            .save(&SecretStore::key(AuthType::OAuth2, channel), StoredSecret {
                username: None,
                secret: token,
            })?;
        info!(%channel, "stored oauth2 token");
        Ok(())
    }

    fn remove_secret(&self, channel: &ChannelId, _settings: &ChannelSettings) -> Result<()> {
        let removed = self
            .store
            .delete(&SecretStore::key(AuthType::OAuth2, channel))?;
        info!(%channel, removed, "removed oauth2 token");
        Ok(())
    }

    fn secret_status(
        &self,
        channel: &ChannelId,
        _settings: &ChannelSettings,
    ) -> Result<SecretStatus> {
        let key = SecretStore::key(AuthType::OAuth2, channel);
        Ok(match self.store.load(&key)? {
            Some(_) => SecretStatus::Stored { username: None },
            None => SecretStatus::Missing,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use secrecy::{ExposeSecret, Secret};

    use super::*;

    #[derive(Default)]
    struct Browser {
        visited: Mutex<Vec<String>>,
    }

    impl Prompt for Browser {
        fn ask(&self, field: Field, _channel: &ChannelId) -> Result<Secret<String>> {
            assert_eq!(field, Field::Token);
            Ok(Secret::new("tok-123".into()))
        }

        fn show_url(&self, url: &str, _channel: &ChannelId) -> Result<()> {
            self.visited.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn channel() -> ChannelId {
        ChannelId::parse("private", "https://conda.anaconda.org").unwrap()
    }

    #[test]
    fn opens_login_url_then_stores_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::new(dir.path());
        let browser = Arc::new(Browser::default());
        let auth = OAuth2Authenticator::new(store.clone(), browser.clone());
        let settings: ChannelSettings = [
            ("channel", "private"),
            ("auth", "oauth2"),
            ("login_url", "https://login.example.com/token"),
        ]
        .into_iter()
        .collect();

        auth.authenticate(&channel(), &settings).unwrap();

        assert_eq!(*browser.visited.lock().unwrap(), vec![
            "https://login.example.com/token".to_string()
        ]);
        let stored = store
            .load(&SecretStore::key(AuthType::OAuth2, &channel()))
            .unwrap()
            .unwrap();
        assert_eq!(stored.secret.expose_secret(), "tok-123");
        assert!(stored.username.is_none());
    }

    #[test]
    fn missing_login_url_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let browser = Arc::new(Browser::default());
        let auth = OAuth2Authenticator::new(SecretStore::new(dir.path()), browser.clone());
        let settings: ChannelSettings = [("channel", "private"), ("auth", "oauth2")]
            .into_iter()
            .collect();

        let err = auth.authenticate(&channel(), &settings).unwrap_err();
        assert!(matches!(err, Error::MissingSetting {
            key: "login_url",
            ..
        }));
        assert!(err.to_string().contains("\"private\""), "{err}");
        assert!(browser.visited.lock().unwrap().is_empty());
    }

    #[test]
    fn invalid_login_url_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let auth = OAuth2Authenticator::new(
            SecretStore::new(dir.path()),
            Arc::new(Browser::default()),
        );
        let settings: ChannelSettings = [("login_url", "not a url")].into_iter().collect();
        let err = auth.authenticate(&channel(), &settings).unwrap_err();
        assert!(err.to_string().starts_with("invalid login_url"), "{err}");
    }

    #[test]
    fn logout_without_token_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let auth = OAuth2Authenticator::new(
            SecretStore::new(dir.path()),
            Arc::new(Browser::default()),
        );
        auth.remove_secret(&channel(), &ChannelSettings::new())
            .unwrap();
        assert_eq!(
            auth.secret_status(&channel(), &ChannelSettings::new())
                .unwrap(),
            SecretStatus::Missing
        );
    }
}
