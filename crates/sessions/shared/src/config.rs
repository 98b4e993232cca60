//! Configuration for session hosting and discovery defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a [`SessionsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse sessions config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid sessions config: {0}")]
    Invalid(&'static str),
}

/// Defaults a game client uses when hosting or browsing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Player slots offered when hosting.
    pub public_connections: u32,
    /// Match type tag advertised when hosting and filtered for when browsing.
    pub match_type: String,
    /// Upper bound on discovery results per query.
    pub max_search_results: u32,
    /// Map path travelled to after hosting succeeds.
    pub lobby_path: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            public_connections: 4,
            match_type: "FreeForAll".into(),
            // Generous bound; dev app ids share a session namespace with many
            // other sessions, so small bounds can miss the one we want.
            max_search_results: 10_000,
            lobby_path: "/Game/Maps/Lobby".into(),
        }
    }
}

impl SessionsConfig {
    /// Parses a config from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations no provider would accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_connections == 0 {
            return Err(ConfigError::Invalid("public_connections must be positive"));
        }
        if self.max_search_results == 0 {
            return Err(ConfigError::Invalid("max_search_results must be positive"));
        }
        if self.lobby_path.is_empty() {
            return Err(ConfigError::Invalid("lobby_path must not be empty"));
        }
        Ok(())
    }

    /// The lobby path in listen-server form, ready to travel to.
    pub fn lobby_listen_path(&self) -> String {
        format!("{}?listen", self.lobby_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SessionsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lobby_listen_path(), "/Game/Maps/Lobby?listen");
    }

    #[test]
    fn parses_partial_toml() {
        let config = SessionsConfig::from_toml_str(
            r#"
            public_connections = 8
            match_type = "CaptureTheFlag"
            "#,
        )
        .unwrap();
        assert_eq!(config.public_connections, 8);
        assert_eq!(config.match_type, "CaptureTheFlag");
        assert_eq!(config.max_search_results, 10_000);
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = SessionsConfig::from_toml_str("public_connections = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = SessionsConfig::from_toml_str("public_connections = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
