//! Configuration for the service client and runner.
//!
//! All configuration is loaded from environment variables, each with a
//! default pointing at the public course service. [`ClientConfig::from_lookup`]
//! takes the variable source as a closure so tests need not touch the
//! process environment.

use std::time::Duration;

use pokedex_types::CreatureId;

use crate::error::ClientError;

/// Root of the public catalog and battle service.
pub const DEFAULT_BASE_URL: &str =
    "https://courses.cs.washington.edu/courses/cse154/webservices/pokedex/";

/// Default bound on a single service request, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default number of turns the runner plays before forfeiting.
pub const DEFAULT_MAX_TURNS: u32 = 50;

/// Default creature the runner battles with.
pub const DEFAULT_PLAYER: &str = "bulbasaur";

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Catalog endpoint (`pokedex.php`).
    pub pokedex_url: String,
    /// Battle endpoint (`game.php`).
    pub game_url: String,
    /// Root that creature image paths are relative to.
    pub data_url: String,
    /// Directory of `{spriteKey}.png` sprites.
    pub sprites_url: String,
    /// Directory of `{type}.jpg` move-type icons.
    pub icons_url: String,
    /// Bound on each service request.
    pub request_timeout: Duration,
    /// Creature the runner battles with.
    pub player: CreatureId,
    /// Turns the runner plays before forfeiting.
    pub max_turns: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pokedex_url: format!("{DEFAULT_BASE_URL}pokedex.php"),
            game_url: format!("{DEFAULT_BASE_URL}game.php"),
            data_url: DEFAULT_BASE_URL.to_owned(),
            sprites_url: format!("{DEFAULT_BASE_URL}sprites/"),
            icons_url: format!("{DEFAULT_BASE_URL}icons/"),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            player: CreatureId::from(DEFAULT_PLAYER),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `POKEDEX_URL` -- catalog endpoint
    /// - `POKEDEX_GAME_URL` -- battle endpoint
    /// - `POKEDEX_DATA_URL` -- image root
    /// - `POKEDEX_SPRITES_URL` -- sprite directory
    /// - `POKEDEX_ICONS_URL` -- type icon directory
    /// - `POKEDEX_REQUEST_TIMEOUT_MS` -- request bound in milliseconds (default 10000)
    /// - `POKEDEX_PLAYER` -- creature the runner battles with (default `bulbasaur`)
    /// - `POKEDEX_MAX_TURNS` -- turns before the runner forfeits (default 50)
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for a malformed value.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for a malformed value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let defaults = Self::default();

        let url = |name: &str, default: String| -> Result<String, ClientError> {
            match lookup(name) {
                Some(value) => parse_url(name, &value),
                None => Ok(default),
            }
        };

        let request_timeout_ms: u64 = lookup("POKEDEX_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| DEFAULT_REQUEST_TIMEOUT_MS.to_string())
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid POKEDEX_REQUEST_TIMEOUT_MS: {e}")))?;
        if request_timeout_ms == 0 {
            return Err(ClientError::Config(String::from(
                "invalid POKEDEX_REQUEST_TIMEOUT_MS: must be positive",
            )));
        }

        let max_turns: u32 = lookup("POKEDEX_MAX_TURNS")
            .unwrap_or_else(|| DEFAULT_MAX_TURNS.to_string())
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid POKEDEX_MAX_TURNS: {e}")))?;

        let player = lookup("POKEDEX_PLAYER")
            .map(|raw| raw.trim().to_lowercase())
            .unwrap_or_else(|| DEFAULT_PLAYER.to_owned());
        if player.is_empty() {
            return Err(ClientError::Config(String::from(
                "invalid POKEDEX_PLAYER: must not be empty",
            )));
        }

        Ok(Self {
            pokedex_url: url("POKEDEX_URL", defaults.pokedex_url)?,
            game_url: url("POKEDEX_GAME_URL", defaults.game_url)?,
            data_url: url("POKEDEX_DATA_URL", defaults.data_url)?,
            sprites_url: url("POKEDEX_SPRITES_URL", defaults.sprites_url)?,
            icons_url: url("POKEDEX_ICONS_URL", defaults.icons_url)?,
            request_timeout: Duration::from_millis(request_timeout_ms),
            player: CreatureId::from(player),
            max_turns,
        })
    }
}

/// Accept only absolute `http`/`https` URLs.
fn parse_url(name: &str, value: &str) -> Result<String, ClientError> {
    let trimmed = value.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ClientError::Config(format!(
            "invalid {name}: expected an http(s) URL, got {trimmed:?}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config.ok(), Some(ClientConfig::default()));
    }

    #[test]
    fn default_endpoints_share_the_service_root() {
        let config = ClientConfig::default();
        assert!(config.pokedex_url.ends_with("/pokedex/pokedex.php"));
        assert!(config.game_url.ends_with("/pokedex/game.php"));
        assert!(config.sprites_url.ends_with("/sprites/"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.player.as_str(), "bulbasaur");
    }

    #[test]
    fn overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("POKEDEX_URL", "http://localhost:8080/pokedex.php"),
            ("POKEDEX_REQUEST_TIMEOUT_MS", "250"),
            ("POKEDEX_PLAYER", " Squirtle "),
            ("POKEDEX_MAX_TURNS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.pokedex_url, "http://localhost:8080/pokedex.php");
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.player.as_str(), "squirtle");
        assert_eq!(config.max_turns, 3);
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for vars in [
            [("POKEDEX_REQUEST_TIMEOUT_MS", "soon")],
            [("POKEDEX_REQUEST_TIMEOUT_MS", "0")],
            [("POKEDEX_MAX_TURNS", "-1")],
            [("POKEDEX_GAME_URL", "game.php")],
            [("POKEDEX_PLAYER", "  ")],
        ] {
            assert!(matches!(
                ClientConfig::from_lookup(lookup(&vars)),
                Err(ClientError::Config(_))
            ));
        }
    }
}
