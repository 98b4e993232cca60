use bevy_ecs::prelude::*;

use crate::events::JoinSessionResult;
use crate::settings::SessionSearchResult;

/// Hosting finished, successfully or not. On success the listener is
/// responsible for travelling to the lobby.
#[derive(Event, Debug, Clone)]
pub struct CreateSessionCompleteEvent {
    pub success: bool,
}

/// A discovery query finished. An empty result list is always reported with
/// `success == false`.
#[derive(Event, Debug, Clone)]
pub struct FindSessionsCompleteEvent {
    pub results: Vec<SessionSearchResult>,
    pub success: bool,
}

/// A join attempt resolved with the provider's verbatim result code.
#[derive(Event, Debug, Clone)]
pub struct JoinSessionCompleteEvent(pub JoinSessionResult);

/// The well-known session was torn down (or teardown failed).
#[derive(Event, Debug, Clone)]
pub struct DestroySessionCompleteEvent {
    pub success: bool,
}

/// The session transitioned to in-progress (or failed to).
#[derive(Event, Debug, Clone)]
pub struct StartSessionCompleteEvent {
    pub success: bool,
}
