//! Synthesises the players' track-changed notifications by polling.
//!
//! A terminal process doesn't receive the distributed notifications the
//! players post, so every registered player is polled on an interval and a
//! notification is emitted whenever its payload changes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::notification::{
    ExternalNotification, KEY_ALBUM, KEY_ARTIST, KEY_NAME, KEY_PLAYER_STATE,
};
use crate::player::{PlayerId, PlayerSnapshot, PlayersManager};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Last payload seen per player.
#[derive(Debug, Default)]
pub struct PayloadDiff {
    last: HashMap<PlayerId, ExternalNotification>,
}

impl PayloadDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notification to emit for this poll, if any.
    ///
    /// The first poll of a player only records its payload: the panel loads
    /// whatever is playing at startup on its own.
    pub fn observe(
        &mut self,
        id: PlayerId,
        snapshot: Option<&PlayerSnapshot>,
    ) -> Option<ExternalNotification> {
        let payload = ExternalNotification::from_snapshot(id, snapshot);
        let previous = self.last.insert(id, payload.clone())?;

        (!same_track_state(&previous, &payload)).then_some(payload)
    }
}

/// Players report the duration late, so only these keys count as a change.
const TRACKED_KEYS: [&str; 4] = [KEY_NAME, KEY_ARTIST, KEY_ALBUM, KEY_PLAYER_STATE];

fn same_track_state(a: &ExternalNotification, b: &ExternalNotification) -> bool {
    TRACKED_KEYS.iter().all(|key| a.get(key) == b.get(key))
}

/// Polls every helper of `manager` until the receiver goes away.
pub fn spawn<T>(
    manager: Arc<PlayersManager>,
    interval: Duration,
    tx: mpsc::Sender<T>,
) -> JoinHandle<()>
where
    T: From<ExternalNotification> + Send + 'static,
{
    tokio::spawn(async move {
        let mut diff = PayloadDiff::new();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let manager_ref = manager.clone();
            // AppleScript calls block for tens of milliseconds
            let polled = tokio::task::spawn_blocking(move || {
                manager_ref
                    .helpers()
                    .map(|helper| {
                        let snapshot = helper.snapshot().unwrap_or_else(|e| {
                            tracing::debug!(player = %helper.id(), error = %e, "snapshot failed");
                            None
                        });
                        (helper.id(), snapshot)
                    })
                    .collect::<Vec<_>>()
            })
            .await;

            let Ok(polled) = polled else {
                tracing::warn!("player poll task panicked");
                continue;
            };

            for (id, snapshot) in polled {
                if let Some(notification) = diff.observe(id, snapshot.as_ref()) {
                    if tx.send(T::from(notification)).await.is_err() {
                        return;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::KEY_TOTAL_TIME;
    use crate::player::{PlayerState, Song};

    fn snapshot(name: &str, state: PlayerState, position: f64) -> PlayerSnapshot {
        PlayerSnapshot {
            state,
            song: Song {
                name: name.into(),
                artist: "Artist".into(),
                album: "Album".into(),
                duration: 180.0,
            },
            position,
            volume: 50,
            artwork_url: None,
        }
    }

    #[test]
    fn test_emits_only_on_change() {
        let mut diff = PayloadDiff::new();
        let first = snapshot("One", PlayerState::Playing, 1.0);
        assert!(diff.observe(PlayerId::Spotify, Some(&first)).is_none());

        // Position isn't part of the payload
        let later = snapshot("One", PlayerState::Playing, 5.0);
        assert!(diff.observe(PlayerId::Spotify, Some(&later)).is_none());

        let paused = snapshot("One", PlayerState::Paused, 5.0);
        let n = diff.observe(PlayerId::Spotify, Some(&paused)).unwrap();
        assert_eq!(n.get(KEY_PLAYER_STATE), Some("Paused"));

        let next = snapshot("Two", PlayerState::Paused, 0.0);
        let n = diff.observe(PlayerId::Spotify, Some(&next)).unwrap();
        assert_eq!(n.get(KEY_NAME), Some("Two"));
    }

    #[test]
    fn test_first_poll_is_silent() {
        let mut diff = PayloadDiff::new();
        let playing = snapshot("One", PlayerState::Playing, 0.0);
        assert!(diff.observe(PlayerId::Music, Some(&playing)).is_none());
        assert!(diff.observe(PlayerId::Music, Some(&playing)).is_none());
    }

    #[test]
    fn test_late_duration_is_not_a_change() {
        let mut diff = PayloadDiff::new();
        let mut song = snapshot("One", PlayerState::Playing, 0.0);
        song.song.duration = 0.0;
        diff.observe(PlayerId::Music, Some(&song));

        song.song.duration = 200.0;
        assert_eq!(
            ExternalNotification::from_snapshot(PlayerId::Music, Some(&song)).get(KEY_TOTAL_TIME),
            Some("200000")
        );
        assert!(diff.observe(PlayerId::Music, Some(&song)).is_none());
    }

    #[test]
    fn test_launching_player_is_announced() {
        let mut diff = PayloadDiff::new();
        assert!(diff.observe(PlayerId::Spotify, None).is_none());

        let playing = snapshot("One", PlayerState::Playing, 0.0);
        let n = diff.observe(PlayerId::Spotify, Some(&playing)).unwrap();
        assert_eq!(n.get(KEY_NAME), Some("One"));
    }

    #[test]
    fn test_quitting_player_sends_closing_payload() {
        let mut diff = PayloadDiff::new();
        diff.observe(PlayerId::Music, Some(&snapshot("One", PlayerState::Playing, 0.0)));

        let n = diff.observe(PlayerId::Music, None).unwrap();
        assert_eq!(n.user_info.len(), 1);
        assert_eq!(n.get(KEY_PLAYER_STATE), Some("Stopped"));

        // Only once
        assert!(diff.observe(PlayerId::Music, None).is_none());
    }

    #[test]
    fn test_never_running_player_is_silent() {
        let mut diff = PayloadDiff::new();
        assert!(diff.observe(PlayerId::Spotify, None).is_none());
        assert!(diff.observe(PlayerId::Spotify, None).is_none());
    }
}
