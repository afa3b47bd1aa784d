use serde::{Deserialize, Serialize};

use crate::player::PlayerId;
use crate::spotify::SpotifyCredentials;

/// User-editable configuration, stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub keys: crate::app::keys::KeyConfig,
    /// Player shown when none is running
    #[serde(default = "default_player")]
    pub default_player: PlayerId,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Title button length on narrow terminals
    #[serde(default = "default_title_length")]
    pub title_length: usize,
    /// Volume change per key press
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,
    #[serde(default)]
    pub spotify: SpotifyCredentials,
}

fn default_player() -> PlayerId {
    PlayerId::Music
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_title_length() -> usize {
    14
}

fn default_volume_step() -> u8 {
    5
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            keys: crate::app::keys::KeyConfig::default(),
            default_player: default_player(),
            poll_interval_ms: default_poll_interval_ms(),
            title_length: default_title_length(),
            volume_step: default_volume_step(),
            spotify: SpotifyCredentials::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: UserConfig = toml::from_str(
            r#"
            default_player = "spotify"

            [spotify]
            client_id = "id"
            client_secret = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_player, PlayerId::Spotify);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.title_length, 14);
        assert_eq!(config.keys.play_pause, "Space");
        assert!(config.spotify.is_configured());
        assert_eq!(config.spotify.redirect_uri, "muse://callback");
    }

    #[test]
    fn test_default_config_round_trips() {
        let text = toml::to_string_pretty(&UserConfig::default()).unwrap();
        let parsed: UserConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.volume_step, 5);
        assert_eq!(parsed.keys.quit, "q");
    }
}
