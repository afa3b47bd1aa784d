use std::sync::Arc;

use super::common::{parse_raw_data, parse_snapshot, ScriptedPlayer};
use crate::notification::{NotificationCenter, PlayerNotification};
use crate::player::controller::traits::ScriptRunner;
use crate::player::error::Result;
use crate::player::{
    Artwork, LikablePlayerHelper, PlayerHelper, PlayerId, PlayerSnapshot, PlayerState,
};

const SNAPSHOT_SCRIPT: &str = r#"
    if player state is stopped then
        return "STOPPED"
    end if

    set tName to name of current track
    set tArtist to artist of current track
    set tAlbum to album of current track
    set tDuration to duration of current track
    set tPosition to player position
    set tState to player state as string
    set tVol to sound volume

    return tName & "|||" & tArtist & "|||" & tAlbum & "|||" & tDuration & "|||" & tPosition & "|||" & tState & "|||" & "NONE" & "|||" & tVol
"#;

/// Apple Music (formerly iTunes).
pub struct MusicHelper {
    player: ScriptedPlayer,
}

impl MusicHelper {
    pub fn new(runner: Arc<dyn ScriptRunner>, center: NotificationCenter) -> Self {
        Self {
            player: ScriptedPlayer::new(PlayerId::Music, runner, center),
        }
    }

    fn duration(&self) -> f64 {
        self.player
            .tell("return duration of current track")
            .ok()
            .and_then(|s| super::common::parse_number(&s))
            .unwrap_or(0.0)
    }
}

impl PlayerHelper for MusicHelper {
    fn id(&self) -> PlayerId {
        PlayerId::Music
    }

    fn is_available(&self) -> bool {
        self.player.is_available()
    }

    fn snapshot(&self) -> Result<Option<PlayerSnapshot>> {
        if !self.is_available() {
            return Ok(None);
        }
        let output = self.player.tell_block(SNAPSHOT_SCRIPT)?;
        Ok(parse_snapshot(&output, false))
    }

    fn player_state(&self) -> PlayerState {
        self.player.player_state()
    }

    fn playback_position(&self) -> f64 {
        self.player.playback_position()
    }

    fn play(&self) -> Result<()> {
        self.player.play()
    }

    fn pause(&self) -> Result<()> {
        self.player.pause()
    }

    fn toggle_play_pause(&self) -> Result<bool> {
        self.player.toggle_play_pause()
    }

    fn next_track(&self) -> Result<()> {
        self.player.next_track()
    }

    fn previous_track(&self) -> Result<()> {
        self.player.previous_track()
    }

    fn scrub(&self, to: Option<f64>, touching: bool) -> Result<()> {
        let duration = if to.is_some() { self.duration() } else { 0.0 };
        self.player.scrub(to, touching, duration)
    }

    fn volume(&self) -> u8 {
        self.player.volume()
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        self.player.set_volume(volume)
    }

    fn shuffling(&self) -> bool {
        self.player
            .tell("return shuffle enabled")
            .map(|s| s == "true")
            .unwrap_or(false)
    }

    fn set_shuffling(&self, enabled: bool) -> Result<()> {
        self.player.tell(&format!("set shuffle enabled to {enabled}"))?;
        self.player.post(PlayerNotification::Shuffling(enabled));
        Ok(())
    }

    fn repeating(&self) -> bool {
        // off, one, all
        self.player
            .tell("return song repeat as string")
            .map(|s| s == "all" || s == "one")
            .unwrap_or(false)
    }

    fn set_repeating(&self, enabled: bool) -> Result<()> {
        let mode = if enabled { "all" } else { "off" };
        self.player.tell(&format!("set song repeat to {mode}"))?;
        self.player.post(PlayerNotification::Repeating(enabled));
        Ok(())
    }

    fn artwork(&self) -> Artwork {
        self.player
            .tell("return raw data of artwork 1 of current track")
            .ok()
            .and_then(|s| parse_raw_data(&s))
            .map(Artwork::Bytes)
            .unwrap_or(Artwork::None)
    }

    fn activate(&self) -> Result<()> {
        self.player.activate()
    }

    fn as_likable(&self) -> Option<&dyn LikablePlayerHelper> {
        Some(self)
    }
}

impl LikablePlayerHelper for MusicHelper {
    fn liked(&self) -> Result<bool> {
        // Newer releases renamed "loved" to "favorited"
        let output = self
            .player
            .tell("return favorited of current track")
            .or_else(|_| self.player.tell("return loved of current track"))?;
        Ok(output == "true")
    }

    fn toggle_liked(&self) -> Result<bool> {
        let liked = !self.liked()?;
        self.player
            .tell(&format!("set favorited of current track to {liked}"))
            .or_else(|_| {
                self.player
                    .tell(&format!("set loved of current track to {liked}"))
            })?;
        self.player.post(PlayerNotification::Like(liked));
        Ok(liked)
    }
}

#[cfg(test)]
mod tests {
    use super::super::common::testing::FakeRunner;
    use super::*;

    #[test]
    fn test_toggle_liked_flips_and_posts() {
        let runner = Arc::new(FakeRunner::running());
        runner.answer("return favorited", "false");
        let center = NotificationCenter::new();
        let mut rx = center.observe();
        let music = MusicHelper::new(runner.clone(), center);

        assert!(music.toggle_liked().unwrap());
        assert_eq!(rx.try_recv().ok(), Some(PlayerNotification::Like(true)));
        assert!(runner
            .scripts()
            .iter()
            .any(|s| s.contains("set favorited of current track to true")));
    }

    #[test]
    fn test_repeat_modes() {
        let runner = Arc::new(FakeRunner::running());
        runner.answer("song repeat as string", "one");
        let music = MusicHelper::new(runner.clone(), NotificationCenter::new());
        assert!(music.repeating());

        music.set_repeating(false).unwrap();
        assert!(runner.scripts().last().unwrap().contains("set song repeat to off"));
    }

    #[test]
    fn test_snapshot_none_when_not_running() {
        let music = MusicHelper::new(Arc::new(FakeRunner::default()), NotificationCenter::new());
        assert!(music.snapshot().unwrap().is_none());
        assert_eq!(music.artwork(), Artwork::None);
    }
}
