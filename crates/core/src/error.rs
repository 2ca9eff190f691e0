use channel_auth_common::FromMessage;

use crate::authenticator::AuthType;

/// Failures raised while resolving a channel to its authenticator.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A `channel_settings` entry names an `auth` type that is not registered,
    /// or names none at all.
    #[error("{}", unknown_auth_type_message(.channel, .auth_type.as_deref(), .available))]
    UnknownAuthType {
        channel: String,
        auth_type: Option<String>,
        available: Vec<String>,
    },

    /// No `channel_settings` entry matches the requested channel.
    #[error(
        "unrecognized channel: {channel}. Make sure this channel is defined in your \
         configuration and has an entry in \"channel_settings\".\n\n{}",
        config_example(.channel)
    )]
    UnknownChannel { channel: String },

    /// A channel string could not be normalized.
    #[error("invalid channel \"{value}\": {reason}")]
    InvalidChannel { value: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("channel \"{channel}\" needs a \"{key}\" setting for {auth_type} authentication")]
    MissingSetting {
        channel: String,
        key: &'static str,
        auth_type: AuthType,
    },

    #[error("{message}")]
    Prompt { message: String },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt {
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

channel_auth_common::impl_context!();

/// A `channel_settings` snippet showing how to configure `channel`.
pub(crate) fn config_example(channel: &str) -> String {
    format!(
        "channel_settings:\n  - channel: {channel}\n    auth: {}\n    username: user_one",
        AuthType::HttpBasic
    )
}

fn unknown_auth_type_message(
    channel: &str,
    auth_type: Option<&str>,
    available: &[String],
) -> String {
    let choices = available.join(", ");
    let mut message = match auth_type {
        Some(auth_type) => format!(
            "invalid authentication type \"{auth_type}\" configured for \"{channel}\". \
             Possible choices: {choices}"
        ),
        None => format!(
            "no authentication type configured for \"{channel}\". Please make sure \"auth\" \
             is defined in \"channel_settings\". Possible choices: {choices}"
        ),
    };
    if let Some(hint) = auth_type.and_then(|t| suggest(t, available)) {
        message.push_str(&format!(" (did you mean \"{hint}\"?)"));
    }
    message.push_str("\n\n");
    message.push_str(&config_example(channel));
    message
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Closest registered name within a small edit distance, for typo hints.
fn suggest<'a>(needle: &str, candidates: &'a [String]) -> Option<&'a str> {
    const MAX_DISTANCE: usize = 3;
    candidates
        .iter()
        .map(|c| (c.as_str(), levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= MAX_DISTANCE)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn names() -> Vec<String> {
        vec!["oauth2".into(), "http-basic".into()]
    }

    #[rstest]
    #[case("", "abc", 3)]
    #[case("abc", "", 3)]
    #[case("http-basic", "http-basic", 0)]
    #[case("http-basci", "http-basic", 2)]
    #[case("oauth", "oauth2", 1)]
    fn edit_distance(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        assert_eq!(levenshtein(a, b), expected);
    }

    #[test]
    fn unknown_auth_type_lists_choices_and_example() {
        let msg = ResolveError::UnknownAuthType {
            channel: "bad".into(),
            auth_type: Some("bogus".into()),
            available: names(),
        }
        .to_string();
        assert!(msg.contains("\"bogus\""), "{msg}");
        assert!(msg.contains("\"bad\""), "{msg}");
        assert!(msg.contains("Possible choices: oauth2, http-basic"), "{msg}");
        assert!(msg.contains("  - channel: bad\n    auth: http-basic"), "{msg}");
        assert!(!msg.contains("did you mean"), "{msg}");
    }

    #[test]
    fn unknown_auth_type_suggests_close_name() {
        let msg = ResolveError::UnknownAuthType {
            channel: "foo".into(),
            auth_type: Some("http-basci".into()),
            available: names(),
        }
        .to_string();
        assert!(msg.contains("did you mean \"http-basic\"?"), "{msg}");
    }

    #[test]
    fn missing_auth_type_asks_for_auth_key() {
        let msg = ResolveError::UnknownAuthType {
            channel: "foo".into(),
            auth_type: None,
            available: names(),
        }
        .to_string();
        assert!(msg.contains("make sure \"auth\" is defined"), "{msg}");
    }

    #[test]
    fn unknown_channel_shows_example() {
        let msg = ResolveError::UnknownChannel {
            channel: "foo".into(),
        }
        .to_string();
        assert!(msg.starts_with("unrecognized channel: foo."), "{msg}");
        assert!(msg.ends_with("  - channel: foo\n    auth: http-basic\n    username: user_one"));
    }
}
