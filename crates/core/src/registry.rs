use std::{fmt, sync::Arc};

use crate::{
    AuthType, Authenticator, HttpBasicAuthenticator, OAuth2Authenticator, prompt::Prompt,
    storage::SecretStore,
};

/// Maps `auth` type names to authenticators.
///
/// Built once at startup and read-only afterwards. Lookup is by exact name;
/// registration order is kept for listing names in error messages.
#[derive(Clone, Default)]
pub struct AuthRegistry {
    entries: Vec<(String, Arc<dyn Authenticator>)>,
}

impl AuthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in [`AuthType`], sharing one store and prompt.
    pub fn builtin(store: SecretStore, prompt: Arc<dyn Prompt>) -> Self {
        AuthType::ALL
            .into_iter()
            .fold(Self::new(), |registry, auth_type| match auth_type {
                AuthType::OAuth2 => registry.with(
                    auth_type.as_str(),
                    OAuth2Authenticator::new(store.clone(), Arc::clone(&prompt)),
                ),
                AuthType::HttpBasic => registry.with(
                    auth_type.as_str(),
                    HttpBasicAuthenticator::new(store.clone(), Arc::clone(&prompt)),
                ),
            })
    }

    /// Register `authenticator` under `name`, replacing an existing entry of
    /// the same name in place.
    #[must_use]
    pub fn with(
        self,
        name: impl Into<String>,
        authenticator: impl Authenticator + 'static,
    ) -> Self {
        self.with_shared(name, Arc::new(authenticator))
    }

    /// Like [`with`](Self::with) for an already shared authenticator.
    #[must_use]
    pub fn with_shared(
        mut self,
        name: impl Into<String>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = authenticator,
            None => self.entries.push((name, authenticator)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Authenticator>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| Arc::clone(a))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }
}

impl fmt::Debug for AuthRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use channel_auth_config::ChannelSettings;

    use super::*;
    use crate::{ChannelId, Result, TerminalPrompt};

    struct Noop;

    impl Authenticator for Noop {
        fn authenticate(&self, _: &ChannelId, _: &ChannelSettings) -> Result<()> {
            Ok(())
        }

        fn remove_secret(&self, _: &ChannelId, _: &ChannelSettings) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn builtin_registers_every_auth_type_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry =
            AuthRegistry::builtin(SecretStore::new(dir.path()), Arc::new(TerminalPrompt));
        assert_eq!(registry.names(), vec!["oauth2", "http-basic"]);
        assert!(registry.get("http-basic").is_some());
        assert!(registry.get("basic").is_none());
    }

    #[test]
    fn lookup_is_exact() {
        let registry = AuthRegistry::new().with("basic", Noop);
        assert!(registry.get("basic").is_some());
        assert!(registry.get("Basic").is_none());
        assert!(registry.get("basic ").is_none());
        assert!(AuthRegistry::new().get("basic").is_none());
    }

    #[test]
    fn re_registering_replaces_in_place() {
        let first: Arc<dyn Authenticator> = Arc::new(Noop);
        let second: Arc<dyn Authenticator> = Arc::new(Noop);
        let registry = AuthRegistry::new()
            .with_shared("basic", Arc::clone(&first))
            .with("token", Noop)
            .with_shared("basic", Arc::clone(&second));

        assert_eq!(registry.names(), vec!["basic", "token"]);
                assert!(Arc::ptr_eq(&registry.get("basic").unwrap(), &second));
    }

    #[test]
    fn debug_lists_names() {
        let registry = AuthRegistry::new().with("basic", Noop);
        assert_eq!(format!("{registry:?}"), r#"AuthRegistry { names: ["basic"] }"#);
    }
}
