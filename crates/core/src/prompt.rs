//! Interactive input used by authenticators.

use std::{
    io::{BufRead, Write},
    sync::Arc,
};

use {
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
};

use crate::{ChannelId, Error, Result};

/// A value an authenticator may need from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    Token,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Password => "Password",
            Self::Token => "Token",
        }
    }
}

/// Source of user input for an authenticator.
pub trait Prompt: Send + Sync {
    /// Ask for `field`. Blank answers are an error.
    fn ask(&self, field: Field, channel: &ChannelId) -> Result<Secret<String>>;

    /// Send the user to `url` to obtain a credential.
    fn show_url(&self, url: &str, channel: &ChannelId) -> Result<()>;
}

/// Reads answers from stdin and opens URLs in the default browser.
///
/// Input is echoed; pass `--password`/`--token` for unattended use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&self, field: Field, channel: &ChannelId) -> Result<Secret<String>> {
        let label = field.label();
        let mut stdout = std::io::stdout();
        write!(stdout, "{label} for {channel}: ")?;
        stdout.flush()?;

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(Error::prompt(format!(
                "{label} is required but no input is available"
            )));
        }
        let answer = line.trim_end_matches(['\r', '\n']);
        if answer.trim().is_empty() {
            return Err(Error::prompt(format!("{label} is required")));
        }
        Ok(Secret::new(answer.to_string()))
    }

    fn show_url(&self, url: &str, channel: &ChannelId) -> Result<()> {
        println!("Opening browser to log in to {channel}...");
        if open::that(url).is_err() {
            println!("Could not open browser. Please visit:\n{url}");
        }
        Ok(())
    }
}

/// Answers from values supplied up front (command-line flags), falling back
/// to another prompt for anything not supplied.
pub struct PresetPrompt {
    username: Option<String>,
    password: Option<Secret<String>>,
    token: Option<Secret<String>>,
    fallback: Arc<dyn Prompt>,
}

impl PresetPrompt {
    pub fn new(fallback: Arc<dyn Prompt>) -> Self {
        Self {
            username: None,
            password: None,
            token: None,
            fallback,
        }
    }

    #[must_use]
    pub fn username(mut self, username: Option<String>) -> Self {
        self.username = username.filter(|u| !u.trim().is_empty());
        self
    }

    #[must_use]
    pub fn password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|p| !p.is_empty()).map(Secret::new);
        self
    }

    #[must_use]
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty()).map(Secret::new);
        self
    }

    fn preset(&self, field: Field) -> Option<Secret<String>> {
        match field {
            Field::Username => self.username.clone().map(Secret::new),
            Field::Password => self
                .password
                .as_ref()
                .map(|p| Secret::new(p.expose_secret().clone())),
            Field::Token => self
                .token
                .as_ref()
                .map(|t| Secret::new(t.expose_secret().clone())),
        }
    }
}

impl Prompt for PresetPrompt {
    fn ask(&self, field: Field, channel: &ChannelId) -> Result<Secret<String>> {
        match self.preset(field) {
            Some(value) => {
                debug!(field = field.label(), %channel, "using preset value");
                Ok(value)
            },
            None => self.fallback.ask(field, channel),
        }
    }

    fn show_url(&self, url: &str, channel: &ChannelId) -> Result<()> {
        // A preset token makes the browser round-trip pointless.
        if self.token.is_some() {
            debug!(%channel, "token supplied, skipping browser login");
            return Ok(());
        }
        self.fallback.show_url(url, channel)
    }
}
