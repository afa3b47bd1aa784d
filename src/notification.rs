use std::collections::BTreeMap;
use tokio::sync::broadcast;

use crate::player::{PlayerId, PlayerSnapshot, PlayerState};

/// Events describing a change a player helper has just made.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerNotification {
    Play,
    Pause,
    Next,
    Previous,
    /// `time` is the new position in seconds
    Scrub { touching: bool, time: f64 },
    Shuffling(bool),
    Repeating(bool),
    Like(bool),
}

/// Broadcast bus every helper posts to.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    tx: broadcast::Sender<PlayerNotification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn post(&self, event: PlayerNotification) {
        tracing::trace!(?event, "post");
        // No receivers is fine, nobody may be observing yet
        let _ = self.tx.send(event);
    }

    pub fn observe(&self) -> broadcast::Receiver<PlayerNotification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

pub const KEY_NAME: &str = "Name";
pub const KEY_ARTIST: &str = "Artist";
pub const KEY_ALBUM: &str = "Album";
pub const KEY_PLAYER_STATE: &str = "Player State";
pub const KEY_TOTAL_TIME: &str = "Total Time";

/// A player's own track-changed notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalNotification {
    pub name: String,
    pub user_info: BTreeMap<String, String>,
}

impl ExternalNotification {
    /// Builds the payload a player would post for `snapshot`.
    ///
    /// A stopped or quitting player only reports its state.
    pub fn from_snapshot(id: PlayerId, snapshot: Option<&PlayerSnapshot>) -> Self {
        let mut user_info = BTreeMap::new();
        match snapshot {
            Some(s) if s.state != PlayerState::Stopped => {
                user_info.insert(KEY_NAME.to_string(), s.song.name.clone());
                user_info.insert(KEY_ARTIST.to_string(), s.song.artist.clone());
                user_info.insert(KEY_ALBUM.to_string(), s.song.album.clone());
                user_info.insert(KEY_PLAYER_STATE.to_string(), s.state.as_str().to_string());
                // Milliseconds, like the players report it
                user_info.insert(
                    KEY_TOTAL_TIME.to_string(),
                    ((s.song.duration * 1000.0) as u64).to_string(),
                );
            }
            _ => {
                user_info.insert(
                    KEY_PLAYER_STATE.to_string(),
                    PlayerState::Stopped.as_str().to_string(),
                );
            }
        }

        Self {
            name: id.track_changed_notification().to_string(),
            user_info,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.user_info.get(key).map(String::as_str)
    }
}
