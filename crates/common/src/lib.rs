//! Shared error helpers used across the channel-auth crates.

pub mod error;

pub use error::FromMessage;
