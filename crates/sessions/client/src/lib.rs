//! Client-side session lifecycle coordination.
//!
//! The [`SessionCoordinator`] is the single entry point game logic uses to
//! create, find, join, destroy and start multiplayer sessions. It serializes
//! these operations against a [`sessions_shared::SessionProvider`], keeps the
//! per-operation subscription bookkeeping honest and broadcasts exactly one
//! notification per requested operation.

/// Bevy plugin pumping coordinator notifications into ECS events
pub mod bevy;
/// The session lifecycle coordinator
pub mod coordinator;
/// In-memory session provider for local play and tests
pub mod loopback;

pub use coordinator::SessionCoordinator;
pub use loopback::{LoopbackSessionProvider, ProviderCall};
