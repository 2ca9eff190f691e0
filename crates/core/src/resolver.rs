//! Channel resolution: requested channel + ordered settings → authenticator.

use std::sync::Arc;

use {
    channel_auth_config::{ChannelSettings, DEFAULT_CHANNEL_ALIAS},
    tracing::{debug, warn},
};

use crate::{Authenticator, ChannelId, Result, error::ResolveError, registry::AuthRegistry};

/// The validated pairing of a channel, its settings entry and its
/// authenticator. Consumed by [`login`](Self::login) or
/// [`logout`](Self::logout).
pub struct ChannelBinding<'s> {
    channel: ChannelId,
    settings: &'s ChannelSettings,
    authenticator: Arc<dyn Authenticator>,
}

impl<'s> ChannelBinding<'s> {
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn settings(&self) -> &'s ChannelSettings {
        self.settings
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Run the authenticator's login for this channel.
    pub fn login(self) -> Result<ChannelId> {
        self.authenticator
            .authenticate(&self.channel, self.settings)?;
        Ok(self.channel)
    }

    /// Remove this channel's stored secret.
    pub fn logout(self) -> Result<ChannelId> {
        self.authenticator
            .remove_secret(&self.channel, self.settings)?;
        Ok(self.channel)
    }
}

impl std::fmt::Debug for ChannelBinding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelBinding")
            .field("channel", &self.channel)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Finds the settings entry and authenticator for a channel.
#[derive(Debug, Clone)]
pub struct ChannelResolver<'r> {
    registry: &'r AuthRegistry,
    channel_alias: String,
}

impl<'r> ChannelResolver<'r> {
    pub fn new(registry: &'r AuthRegistry) -> Self {
        Self {
            registry,
            channel_alias: DEFAULT_CHANNEL_ALIAS.to_string(),
        }
    }

    /// Resolve bare channel names against `channel_alias` instead of the default.
    #[must_use]
    pub fn with_channel_alias(mut self, channel_alias: impl Into<String>) -> Self {
        self.channel_alias = channel_alias.into();
        self
    }

    pub fn parse_channel(&self, raw: &str) -> std::result::Result<ChannelId, ResolveError> {
        ChannelId::parse(raw, &self.channel_alias)
    }

    /// Find the first entry in `settings` whose channel equals `requested`.
    ///
    /// Every entry with a channel is validated as it is scanned: an `auth`
    /// type missing from the registry aborts the whole call, even when that
    /// entry belongs to another channel. Entries without a channel, or with
    /// one that cannot be parsed, never match.
    pub fn resolve<'s>(
        &self,
        requested: &str,
        settings: &'s [ChannelSettings],
    ) -> std::result::Result<ChannelBinding<'s>, ResolveError> {
        let wanted = self.parse_channel(requested)?;
        debug!(channel = %wanted, entries = settings.len(), "resolving channel");

        for entry in settings {
            let Some(channel_name) = entry.channel() else {
                continue;
            };

            let auth_type = entry.auth();
            let Some(authenticator) = auth_type.and_then(|t| self.registry.get(t)) else {
                debug!(
                    channel = channel_name,
                    auth = auth_type.unwrap_or_default(),
                    "invalid authentication type in channel_settings"
                );
                return Err(ResolveError::UnknownAuthType {
                    channel: channel_name.to_string(),
                    auth_type: auth_type.map(str::to_string),
                    available: self.registry.names(),
                });
            };

            let channel = match self.parse_channel(channel_name) {
                Ok(channel) => channel,
                Err(e) => {
                    warn!(channel = channel_name, error = %e, "skipping unparsable channel");
                    continue;
                },
            };
            if channel == wanted {
                debug!(
                    channel = %channel,
                    auth = auth_type.unwrap_or_default(),
                    "channel resolved"
                );
                return Ok(ChannelBinding {
                    channel,
                    settings: entry,
                    authenticator,
                });
            }
        }

        Err(ResolveError::UnknownChannel {
            channel: requested.to_string(),
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {rstest::rstest, tracing_test::traced_test};

    use super::*;

    /// Records calls so tests can tell which registered instance was bound.
    #[derive(Default)]
    struct Spy {
        calls: Mutex<Vec<(String, &'static str)>>,
    }

    impl Authenticator for Spy {
        fn authenticate(&self, channel: &ChannelId, _: &ChannelSettings) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((channel.to_string(), "authenticate"));
            Ok(())
        }

        fn remove_secret(&self, channel: &ChannelId, _: &ChannelSettings) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((channel.to_string(), "remove_secret"));
            Ok(())
        }
    }

    fn entry(pairs: &[(&str, &str)]) -> ChannelSettings {
        pairs.iter().copied().collect()
    }

    #[test]
    fn entries_without_channel_are_skipped() {
        let registry = AuthRegistry::new().with("basic", Spy::default());
        let settings = vec![
            entry(&[("auth", "bogus")]),
            entry(&[("channel", ""), ("auth", "bogus")]),
            entry(&[("channel", "foo"), ("auth", "basic")]),
        ];
        let binding = ChannelResolver::new(&registry)
            .resolve("foo", &settings)
            .unwrap();
        assert_eq!(binding.settings(), &settings[2]);
    }

    #[test]
    fn missing_auth_key_fails_eagerly() {
        let registry = AuthRegistry::new().with("basic", Spy::default());
        let settings = vec![entry(&[("channel", "foo")])];
        let err = ChannelResolver::new(&registry)
            .resolve("foo", &settings)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnknownAuthType { auth_type: None, ref channel, .. } if channel == "foo"
        ));
    }

    #[rstest]
    #[case("/")]
    #[case("   ")]
    #[case("https://")]
    #[case("mirror:8080")]
    fn unparsable_entry_channel_never_matches(#[case] bad: &str) {
        let registry = AuthRegistry::new().with("basic", Spy::default());
        let settings = vec![
            entry(&[("channel", bad), ("auth", "basic")]),
            entry(&[("channel", "foo"), ("auth", "basic")]),
        ];
        let binding = ChannelResolver::new(&registry)
            .resolve("foo", &settings)
            .unwrap();
        assert_eq!(binding.settings(), &settings[1]);
    }

    #[test]
    fn blank_channel_still_validates_auth() {
        let registry = AuthRegistry::new().with("basic", Spy::default());
        let settings = vec![
            entry(&[("channel", "   "), ("auth", "bogus")]),
            entry(&[("channel", "foo"), ("auth", "basic")]),
        ];
        let err = ChannelResolver::new(&registry)
            .resolve("foo", &settings)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnknownAuthType { ref channel, .. } if channel == "   "
        ));
    }

    #[traced_test]
    #[test]
    fn unknown_auth_type_is_returned_not_warned() {
        let registry = AuthRegistry::new().with("basic", Spy::default());
        let settings = vec![entry(&[("channel", "foo"), ("auth", "bogus")])];
        assert!(
            ChannelResolver::new(&registry)
                .resolve("foo", &settings)
                .is_err()
        );
        assert!(logs_contain("invalid authentication type"));
        assert!(!logs_contain("WARN"));
    }

    #[test]
    fn invalid_requested_channel() {
        let registry = AuthRegistry::new();
        let err = ChannelResolver::new(&registry)
            .resolve("  ", &[])
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidChannel { .. }));
    }

    #[test]
    fn custom_alias_matches_full_urls() {
        let registry = AuthRegistry::new().with("basic", Spy::default());
        let settings = vec![entry(&[
            ("channel", "https://mirror.example.com/internal"),
            ("auth", "basic"),
        ])];
        let resolver =
            ChannelResolver::new(&registry).with_channel_alias("https://mirror.example.com");
        let binding = resolver.resolve("internal", &settings).unwrap();
        assert_eq!(binding.channel().to_string(), "internal");
    }

    #[test]
    fn binding_dispatches_to_bound_authenticator() {
        let spy = Arc::new(Spy::default());
        let registry = AuthRegistry::new().with_shared("basic", spy.clone());
        let settings = vec![entry(&[("channel", "foo"), ("auth", "basic")])];
        let resolver = ChannelResolver::new(&registry);

        let id = resolver.resolve("foo", &settings).unwrap().login().unwrap();
        assert_eq!(id.to_string(), "foo");
        resolver
            .resolve("https://conda.anaconda.org/foo/", &settings)
            .unwrap()
            .logout()
            .unwrap();

        assert_eq!(*spy.calls.lock().unwrap(), vec![
            ("foo".to_string(), "authenticate"),
            ("foo".to_string(), "remove_secret"),
        ]);
    }
}
