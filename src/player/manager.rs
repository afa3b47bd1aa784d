use std::collections::BTreeMap;
use std::sync::Arc;

use super::controller::DummyHelper;
use super::{PlayerHelper, PlayerId};

/// Registry of one helper per known player.
pub struct PlayersManager {
    helpers: BTreeMap<PlayerId, Arc<dyn PlayerHelper>>,
    default_id: PlayerId,
}

impl PlayersManager {
    /// Players without a helper get a [`DummyHelper`].
    pub fn new(helpers: Vec<Arc<dyn PlayerHelper>>, default_id: PlayerId) -> Self {
        let mut map: BTreeMap<PlayerId, Arc<dyn PlayerHelper>> =
            helpers.into_iter().map(|h| (h.id(), h)).collect();
        for id in PlayerId::ALL {
            map.entry(id)
                .or_insert_with(|| Arc::new(DummyHelper::new(id)));
        }

        Self {
            helpers: map,
            default_id,
        }
    }

    pub fn get(&self, id: PlayerId) -> Arc<dyn PlayerHelper> {
        self.helpers
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Arc::new(DummyHelper::new(id)))
    }

    pub fn helpers(&self) -> impl Iterator<Item = &Arc<dyn PlayerHelper>> {
        self.helpers.values()
    }

    /// Default player first, then the rest in declaration order
    fn candidates(&self) -> impl Iterator<Item = PlayerId> + '_ {
        std::iter::once(self.default_id)
            .chain(PlayerId::ALL.into_iter().filter(move |&id| id != self.default_id))
    }

    /// The player that should drive the UI: the first one playing, else the
    /// first one running, else the default.
    pub fn designated_helper_id(&self) -> PlayerId {
        let available: Vec<PlayerId> = self
            .candidates()
            .filter(|&id| self.get(id).is_available())
            .collect();

        available
            .iter()
            .copied()
            .find(|&id| self.get(id).is_playing())
            .or_else(|| available.first().copied())
            .unwrap_or(self.default_id)
    }

    pub fn designated_helper(&self) -> Arc<dyn PlayerHelper> {
        self.get(self.designated_helper_id())
    }

    pub fn id_for_notification(&self, name: &str) -> Option<PlayerId> {
        self.helpers
            .keys()
            .copied()
            .find(|id| id.track_changed_notification() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::controller::macos::common::testing::FakeRunner;
    use crate::player::controller::{MusicHelper, SpotifyHelper};
    use crate::notification::NotificationCenter;

    fn manager(music: FakeRunner, spotify: FakeRunner) -> PlayersManager {
        let center = NotificationCenter::new();
        PlayersManager::new(
            vec![
                Arc::new(MusicHelper::new(Arc::new(music), center.clone())),
                Arc::new(SpotifyHelper::new(Arc::new(spotify), center)),
            ],
            PlayerId::Music,
        )
    }

    #[test]
    fn test_designated_prefers_playing_player() {
        let music = FakeRunner::running();
        music.answer("player state", "paused");
        let spotify = FakeRunner::running();
        spotify.answer("player state", "playing");

        assert_eq!(manager(music, spotify).designated_helper_id(), PlayerId::Spotify);
    }

    #[test]
    fn test_designated_falls_back_to_running_then_default() {
        let spotify = FakeRunner::running();
        spotify.answer("player state", "paused");
        assert_eq!(
            manager(FakeRunner::default(), spotify).designated_helper_id(),
            PlayerId::Spotify
        );

        assert_eq!(
            manager(FakeRunner::default(), FakeRunner::default()).designated_helper_id(),
            PlayerId::Music
        );
    }

    #[test]
    fn test_notification_lookup() {
        let m = PlayersManager::new(Vec::new(), PlayerId::Spotify);
        assert_eq!(m.helpers().count(), 2);
        assert_eq!(
            m.id_for_notification("com.apple.Music.playerInfo"),
            Some(PlayerId::Music)
        );
        assert_eq!(m.id_for_notification("com.example.other"), None);
        // Missing helpers are filled with stand-ins
        assert!(!m.get(PlayerId::Spotify).is_available());
    }
}
