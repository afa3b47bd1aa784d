use std::sync::Arc;

use super::common::{parse_number, parse_snapshot, ScriptedPlayer};
use crate::notification::{NotificationCenter, PlayerNotification};
use crate::player::controller::traits::ScriptRunner;
use crate::player::error::Result;
use crate::player::{Artwork, PlayerHelper, PlayerId, PlayerSnapshot, PlayerState};

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
    set tArtwork to artwork url of current track
    set tVol to sound volume

    return tName & "|||" & tArtist & "|||" & tAlbum & "|||" & tDuration & "|||" & tPosition & "|||" & tState & "|||" & tArtwork & "|||" & tVol
"#;

/// Spotify desktop client. Like status lives in the Web API, see
/// [`SpotifyApi`](crate::spotify::SpotifyApi).
pub struct SpotifyHelper {
    player: ScriptedPlayer,
}

impl SpotifyHelper {
    pub fn new(runner: Arc<dyn ScriptRunner>, center: NotificationCenter) -> Self {
        Self {
            player: ScriptedPlayer::new(PlayerId::Spotify, runner, center),
        }
    }

    /// Spotify reports durations in milliseconds
    fn duration(&self) -> f64 {
        self.player
            .tell("return duration of current track")
            .ok()
            .and_then(|s| parse_number(&s))
            .map(|ms| ms / 1000.0)
            .unwrap_or(0.0)
    }
}

impl PlayerHelper for SpotifyHelper {
    fn id(&self) -> PlayerId {
        PlayerId::Spotify
    }

    fn is_available(&self) -> bool {
        self.player.is_available()
    }

    fn snapshot(&self) -> Result<Option<PlayerSnapshot>> {
        if !self.is_available() {
            return Ok(None);
        }
        let output = self.player.tell_block(SNAPSHOT_SCRIPT)?;
        Ok(parse_snapshot(&output, true))
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
            .tell("return shuffling")
            .map(|s| s == "true")
            .unwrap_or(false)
    }

    fn set_shuffling(&self, enabled: bool) -> Result<()> {
        self.player.tell(&format!("set shuffling to {enabled}"))?;
        self.player.post(PlayerNotification::Shuffling(enabled));
        Ok(())
    }

    fn repeating(&self) -> bool {
        self.player
            .tell("return repeating")
            .map(|s| s == "true")
            .unwrap_or(false)
    }

    fn set_repeating(&self, enabled: bool) -> Result<()> {
        self.player.tell(&format!("set repeating to {enabled}"))?;
        self.player.post(PlayerNotification::Repeating(enabled));
        Ok(())
    }

    fn artwork(&self) -> Artwork {
        self.player
            .tell("return artwork url of current track")
            .ok()
            .filter(|url| url.starts_with("http"))
            .map(Artwork::Url)
            .unwrap_or(Artwork::None)
    }

    fn track_uri(&self) -> Option<String> {
        self.player
            .tell("return id of current track")
            .ok()
            .filter(|id| !id.is_empty())
    }

    fn activate(&self) -> Result<()> {
        self.player.activate()
    }
}
