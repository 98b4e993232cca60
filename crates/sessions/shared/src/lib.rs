//! Types shared between the session lifecycle coordinator and its consumers.
//!
//! Everything here is transport-agnostic: the actual platform session service
//! (Steam, console backends, a loopback stand-in) lives behind the
//! [`SessionProvider`] contract and only its completion events and data
//! descriptors are defined in this crate.

/// Bevy-facing event wrappers for session notifications
pub mod bevy;
/// Session configuration defaults & TOML loading
pub mod config;
/// Completion events, outward notifications and error types
pub mod events;
/// Session provider contract consumed by the coordinator
pub mod provider;
/// Session settings, search descriptors and search results
pub mod settings;

pub use config::{ConfigError, SessionsConfig};
pub use events::{Completion, JoinSessionResult, ProviderError, SessionNotification};
pub use provider::{OperationKind, ProviderHandle, SessionProvider};
pub use settings::{SessionSearch, SessionSearchResult, SessionSettings};

/// Well-known name of the single hostable session per process.
///
/// All lookups, creates and destroys address this one identity; hosting more
/// than one named session at a time is not supported.
pub const GAME_SESSION_NAME: &str = "GameSession";
