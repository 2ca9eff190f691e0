//! Channel-to-authenticator resolution and login/logout dispatch.
//!
//! A [`ChannelResolver`] scans the configured `channel_settings` for the
//! requested channel, validates the entry's `auth` type against an
//! [`AuthRegistry`], and hands back a [`ChannelBinding`] whose authenticator
//! performs the actual login or logout.

pub mod authenticator;
pub mod basic;
pub mod channel;
pub mod commands;
pub mod error;
pub mod oauth2;
pub mod prompt;
pub mod registry;
pub mod resolver;
pub mod storage;

pub use {
    authenticator::{AuthType, Authenticator, SecretStatus},
    basic::HttpBasicAuthenticator,
    channel::ChannelId,
    commands::{ChannelState, ChannelStatus, login, logout, status},
    error::{Error, ResolveError, Result},
    oauth2::OAuth2Authenticator,
    prompt::{Field, PresetPrompt, Prompt, TerminalPrompt},
    registry::AuthRegistry,
    resolver::{ChannelBinding, ChannelResolver},
    storage::{SecretStore, StoredSecret},
};
