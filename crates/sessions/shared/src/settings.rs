//! Descriptors for hosted sessions, discovery queries and discovered sessions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Build id advertised with every hosted session. Sessions with mismatching
/// build ids are not compatible and should not appear in each other's search
/// results.
pub const DEFAULT_BUILD_UNIQUE_ID: u32 = 1;

/// Immutable-once-submitted descriptor for a session being created.
///
/// Built fresh for every create request; the advertisement flags default to
/// the permissive lobby-style setup used for presence-based matchmaking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Number of public connections (player slots) the session offers.
    pub public_connections: u32,
    /// Opaque tag used to filter discovered sessions to a game mode.
    pub match_type: String,
    /// True when the active provider has no online identity (LAN play).
    pub lan_match: bool,
    pub allow_join_in_progress: bool,
    pub allow_join_via_presence: bool,
    pub should_advertise: bool,
    pub uses_presence: bool,
    pub use_lobbies_if_available: bool,
    pub build_unique_id: u32,
}

impl SessionSettings {
    /// Creates settings for a session with the given capacity and match type.
    pub fn new(public_connections: u32, match_type: impl Into<String>, lan_match: bool) -> Self {
        Self {
            public_connections,
            match_type: match_type.into(),
            lan_match,
            allow_join_in_progress: true,
            allow_join_via_presence: true,
            should_advertise: true,
            uses_presence: true,
            use_lobbies_if_available: true,
            build_unique_id: DEFAULT_BUILD_UNIQUE_ID,
        }
    }
}

/// Descriptor for one in-flight discovery query.
///
/// Replaced, never merged, on every new find request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSearch {
    /// Upper bound on the number of results the provider may return.
    pub max_results: u32,
    /// True when querying the local network instead of the online service.
    pub lan_query: bool,
    /// Presence equality filter; only presence-advertised sessions match.
    pub presence: bool,
}

impl SessionSearch {
    pub fn new(max_results: u32, lan_query: bool) -> Self {
        Self {
            max_results,
            lan_query,
            presence: true,
        }
    }
}

/// Opaque handle to one discovered session, annotated with the settings it
/// advertises. The coordinator never mutates results, only forwards them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSearchResult {
    /// Provider-assigned id of the discovered session.
    pub session_id: Uuid,
    /// Display name of the hosting player.
    pub host_name: String,
    /// Players currently in the session.
    pub current_players: u32,
    /// Settings the session advertises, including its match type.
    pub settings: SessionSettings,
}

impl SessionSearchResult {
    pub fn new(host_name: impl Into<String>, settings: SessionSettings) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            host_name: host_name.into(),
            current_players: 0,
            settings,
        }
    }

    /// Free player slots left in the session.
    pub fn open_public_connections(&self) -> u32 {
        self.settings
            .public_connections
            .saturating_sub(self.current_players)
    }

    /// True when the session advertises the given match type. Used by UI
    /// layers to pick a session of the desired game mode from find results.
    pub fn matches_match_type(&self, match_type: &str) -> bool {
        self.settings.match_type == match_type
    }
}
