use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::Result;

/// The external players we know how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerId {
    Music,
    Spotify,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::Music, PlayerId::Spotify];

    /// Process / AppleScript application name
    pub fn app_name(self) -> &'static str {
        match self {
            PlayerId::Music => "Music",
            PlayerId::Spotify => "Spotify",
        }
    }

    pub fn bundle_identifier(self) -> &'static str {
        match self {
            PlayerId::Music => "com.apple.Music",
            PlayerId::Spotify => "com.spotify.client",
        }
    }

    /// Name of the distributed notification the player posts on track changes
    pub fn track_changed_notification(self) -> &'static str {
        match self {
            PlayerId::Music => "com.apple.Music.playerInfo",
            PlayerId::Spotify => "com.spotify.client.PlaybackStateChanged",
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.app_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

impl PlayerState {
    /// Parses the `player state as string` AppleScript answer
    pub fn from_script(s: &str) -> Self {
        match s.trim() {
            "playing" => PlayerState::Playing,
            "paused" => PlayerState::Paused,
            _ => PlayerState::Stopped,
        }
    }

    /// Capitalised form used in notification payloads
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerState::Playing => "Playing",
            PlayerState::Paused => "Paused",
            PlayerState::Stopped => "Stopped",
        }
    }
}

/// Metadata of the song loaded in a player. Duration is in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration: f64,
}

impl Song {
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.duration > 0.0
    }

    /// Stable key used to discard stale async results
    pub fn key(&self) -> String {
        format!("{}\u{1f}{}\u{1f}{}", self.name, self.artist, self.album)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Artwork {
    Url(String),
    Bytes(Vec<u8>),
    None,
}

/// A single polled read of a player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub song: Song,
    /// Seconds
    pub position: f64,
    pub volume: u8,
    pub artwork_url: Option<String>,
}

/// Adapter over one external player's control surface.
///
/// Commands post the matching [`PlayerNotification`](crate::notification::PlayerNotification)
/// on success so every observer sees app-originated changes.
pub trait PlayerHelper: Send + Sync {
    fn id(&self) -> PlayerId;

    /// Whether the player process is running
    fn is_available(&self) -> bool;

    /// `Ok(None)` when the player is stopped or not running
    fn snapshot(&self) -> Result<Option<PlayerSnapshot>>;

    fn song(&self) -> Song {
        self.snapshot()
            .ok()
            .flatten()
            .map(|s| s.song)
            .unwrap_or_default()
    }

    fn player_state(&self) -> PlayerState;

    fn is_playing(&self) -> bool {
        self.player_state() == PlayerState::Playing
    }

    /// Seconds
    fn playback_position(&self) -> f64;

    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    /// Returns whether the player is playing afterwards
    fn toggle_play_pause(&self) -> Result<bool>;
    fn next_track(&self) -> Result<()>;
    fn previous_track(&self) -> Result<()>;

    /// `to` is a fraction of the song duration.
    fn scrub(&self, to: Option<f64>, touching: bool) -> Result<()>;

    fn volume(&self) -> u8;
    fn set_volume(&self, volume: u8) -> Result<()>;

    fn shuffling(&self) -> bool;
    fn set_shuffling(&self, enabled: bool) -> Result<()>;
    fn repeating(&self) -> bool;
    fn set_repeating(&self, enabled: bool) -> Result<()>;

    fn artwork(&self) -> Artwork;

    /// Persistent identifier of the current track, when the player has one
    fn track_uri(&self) -> Option<String> {
        None
    }

    /// Whether the player emits its own notification on play/pause
    fn does_send_play_pause_notification(&self) -> bool {
        true
    }

    /// Nudges the player into publishing a fresh state. The watcher re-reads
    /// every player on each poll, so the scripted helpers keep the no-op.
    fn update_player(&self) {}

    /// Brings the player's window to front
    fn activate(&self) -> Result<()>;

    /// Local like support. Spotify likes go through the Web API instead, see
    /// [`Effect::SetRemoteLike`](crate::tracker::Effect::SetRemoteLike).
    fn as_likable(&self) -> Option<&dyn LikablePlayerHelper> {
        None
    }
}

/// Players that expose a "like" / "love" flag for the current track.
pub trait LikablePlayerHelper: Send + Sync {
    fn liked(&self) -> Result<bool>;

    /// Returns the new value
    fn toggle_liked(&self) -> Result<bool>;
}
