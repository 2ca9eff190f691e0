//! The capability contract every authentication strategy implements.

use std::fmt;

use channel_auth_config::ChannelSettings;

use crate::{ChannelId, Result};

/// A login/logout strategy registered under one `auth` type name.
///
/// Instances are shared by every channel configured with that type, so any
/// per-channel state lives in the authenticator's own storage.
pub trait Authenticator: Send + Sync {
    /// Establish or refresh credentials for `channel`, replacing any stored ones.
    ///
    /// May prompt for input or open a browser.
    fn authenticate(&self, channel: &ChannelId, settings: &ChannelSettings) -> Result<()>;

    /// Delete stored credentials for `channel`.
    ///
    /// Succeeds when nothing is stored.
    fn remove_secret(&self, channel: &ChannelId, settings: &ChannelSettings) -> Result<()>;

    /// Whether credentials are currently stored for `channel`.
    fn secret_status(
        &self,
        _channel: &ChannelId,
        _settings: &ChannelSettings,
    ) -> Result<SecretStatus> {
        Ok(SecretStatus::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretStatus {
    Stored { username: Option<String> },
    Missing,
    /// The authenticator cannot tell.
    Unknown,
}

/// Built-in authentication types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// Browser login that ends with the user pasting a token.
    OAuth2,
    /// Username and password.
    HttpBasic,
}

impl AuthType {
    /// Registration order, which is also the order names are listed in errors.
    pub const ALL: [AuthType; 2] = [AuthType::OAuth2, AuthType::HttpBasic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OAuth2 => "oauth2",
            Self::HttpBasic => "http-basic",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_listed_in_registration_order() {
        let names: Vec<String> = AuthType::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["oauth2", "http-basic"]);
    }
}
