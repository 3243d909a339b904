use bevy::prelude::*;
use log::warn;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8765";

#[derive(Resource, Reflect, Debug, Clone, PartialEq)]
#[reflect(Resource)]
pub struct ClientSettings {
    pub endpoint: String,
    /// How long a request may stay unanswered before the session counts as disconnected.
    pub response_timeout: Duration,
    pub max_queued_moves: usize,
    /// Send a resync request whenever a key is released.
    pub resync_on_release: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            response_timeout: Duration::from_secs(5),
            max_queued_moves: 3,
            resync_on_release: true,
        }
    }
}

impl ClientSettings {
    /// Defaults overridden by `GAME_SERVER_URL`, `GAME_RESPONSE_TIMEOUT_MS`
    /// and `GAME_RESYNC_ON_RELEASE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(endpoint) = lookup("GAME_SERVER_URL") {
            settings.endpoint = endpoint;
        }

        if let Some(raw) = lookup("GAME_RESPONSE_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => settings.response_timeout = Duration::from_millis(ms),
                Err(e) => warn!("ignoring GAME_RESPONSE_TIMEOUT_MS={:?}: {}", raw, e),
            }
        }

        if let Some(raw) = lookup("GAME_RESYNC_ON_RELEASE") {
            match raw.trim() {
                "1" | "true" | "yes" => settings.resync_on_release = true,
                "0" | "false" | "no" => settings.resync_on_release = false,
                other => warn!("ignoring GAME_RESYNC_ON_RELEASE={:?}", other),
            }
        }

        settings
    }
}
