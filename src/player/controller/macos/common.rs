use std::process::Command;
use std::sync::Arc;

use crate::notification::{NotificationCenter, PlayerNotification};
use crate::player::controller::traits::ScriptRunner;
use crate::player::error::{PlayerError, Result};
use crate::player::{PlayerId, PlayerSnapshot, PlayerState, Song};

/// Production runner: `osascript -e` and `pgrep -x`.
pub struct Osascript;

impl ScriptRunner for Osascript {
    fn run(&self, script: &str) -> Result<String> {
        let output = Command::new("osascript").arg("-e").arg(script).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlayerError::Script(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn is_running(&self, app_name: &str) -> bool {
        match Command::new("pgrep").arg("-x").arg(app_name).output() {
            Ok(o) => o.status.success(),
            Err(_) => false,
        }
    }
}

pub const SEPARATOR: &str = "|||";

/// State shared by the AppleScript-driven helpers.
pub struct ScriptedPlayer {
    pub id: PlayerId,
    pub runner: Arc<dyn ScriptRunner>,
    pub center: NotificationCenter,
}

impl ScriptedPlayer {
    pub fn new(id: PlayerId, runner: Arc<dyn ScriptRunner>, center: NotificationCenter) -> Self {
        Self { id, runner, center }
    }

    pub fn is_available(&self) -> bool {
        self.runner.is_running(self.id.app_name())
    }

    /// `tell application "<player>" to <body>`.
    ///
    /// Refuses to talk to a player that isn't running, since any `tell`
    /// would launch it.
    pub fn tell(&self, body: &str) -> Result<String> {
        if !self.is_available() {
            return Err(PlayerError::NotRunning(self.id));
        }
        self.runner
            .run(&format!("tell application \"{}\" to {}", self.id.app_name(), body))
    }

    pub fn tell_block(&self, body: &str) -> Result<String> {
        if !self.is_available() {
            return Err(PlayerError::NotRunning(self.id));
        }
        self.runner.run(&format!(
            "tell application \"{}\"\n{}\nend tell",
            self.id.app_name(),
            body
        ))
    }

    pub fn post(&self, event: PlayerNotification) {
        self.center.post(event);
    }

    pub fn player_state(&self) -> PlayerState {
        self.tell("return player state as string")
            .map(|s| PlayerState::from_script(&s))
            .unwrap_or(PlayerState::Stopped)
    }

    pub fn playback_position(&self) -> f64 {
        self.tell("return player position")
            .ok()
            .and_then(|s| parse_number(&s))
            .unwrap_or(0.0)
    }

    pub fn play(&self) -> Result<()> {
        self.tell("play")?;
        self.post(PlayerNotification::Play);
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        self.tell("pause")?;
        self.post(PlayerNotification::Pause);
        Ok(())
    }

    pub fn toggle_play_pause(&self) -> Result<bool> {
        let output = self.tell_block("playpause\ndelay 0.1\nreturn player state as string")?;
        let playing = PlayerState::from_script(&output) == PlayerState::Playing;
        self.post(if playing {
            PlayerNotification::Play
        } else {
            PlayerNotification::Pause
        });
        Ok(playing)
    }

    pub fn next_track(&self) -> Result<()> {
        self.tell("next track")?;
        self.post(PlayerNotification::Next);
        Ok(())
    }

    pub fn previous_track(&self) -> Result<()> {
        self.tell("previous track")?;
        self.post(PlayerNotification::Previous);
        Ok(())
    }

    /// Moves to `to * duration` (when given) and reports the resulting time.
    pub fn scrub(&self, to: Option<f64>, touching: bool, duration: f64) -> Result<()> {
        let time = match to {
            Some(fraction) => {
                let time = fraction.clamp(0.0, 1.0) * duration;
                self.tell(&format!("set player position to {time:.3}"))?;
                time
            }
            None => self.playback_position(),
        };
        self.post(PlayerNotification::Scrub { touching, time });
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        self.tell("return sound volume")
            .ok()
            .and_then(|s| parse_number(&s))
            .map(|v| v.clamp(0.0, 100.0) as u8)
            .unwrap_or(0)
    }

    pub fn set_volume(&self, volume: u8) -> Result<()> {
        self.tell(&format!("set sound volume to {}", volume.min(100)))?;
        Ok(())
    }

    pub fn activate(&self) -> Result<()> {
        self.tell("activate")?;
        Ok(())
    }
}

/// AppleScript numbers follow the user's locale ("12,5").
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse().ok()
}

/// Parses the output of the snapshot scripts:
/// `name|||artist|||album|||duration|||position|||state|||artwork|||volume`.
///
/// `duration_in_ms` tells how the player reports the song duration.
pub fn parse_snapshot(output: &str, duration_in_ms: bool) -> Option<PlayerSnapshot> {
    if output.trim() == "STOPPED" {
        return None;
    }

    let parts: Vec<&str> = output.split(SEPARATOR).collect();
    if parts.len() < 7 {
        return None;
    }

    let raw_duration = parse_number(parts[3]).unwrap_or(0.0);
    let duration = if duration_in_ms {
        raw_duration / 1000.0
    } else {
        raw_duration
    };

    let volume = parts
        .get(7)
        .and_then(|v| parse_number(v))
        .map(|v| v.clamp(0.0, 100.0) as u8)
        .unwrap_or(0);

    Some(PlayerSnapshot {
        state: PlayerState::from_script(parts[5]),
        song: Song {
            name: parts[0].to_string(),
            artist: parts[1].to_string(),
            album: parts[2].to_string(),
            duration,
        },
        position: parse_number(parts[4]).unwrap_or(0.0),
        volume,
        artwork_url: Some(parts[6].trim().to_string()).filter(|s| !s.is_empty() && s != "NONE"),
    })
}

/// Decodes an AppleScript raw data literal such as `«data PNGf89504E47…»`.
pub fn parse_raw_data(output: &str) -> Option<Vec<u8>> {
    let body = output.trim().strip_prefix("«data ")?.strip_suffix('»')?;
    // Four-character type code, then hex
    let hex = body.get(4..)?;
    if hex.is_empty() || hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records scripts and answers them from a table of substrings.
    #[derive(Default)]
    pub struct FakeRunner {
        pub running: bool,
        pub answers: Mutex<HashMap<String, String>>,
        pub scripts: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        pub fn running() -> Self {
            Self {
                running: true,
                ..Default::default()
            }
        }

        pub fn answer(&self, needle: &str, reply: &str) {
            self.answers
                .lock()
                .unwrap()
                .insert(needle.to_string(), reply.to_string());
        }

        pub fn scripts(&self) -> Vec<String> {
            self.scripts.lock().unwrap().clone()
        }
    }

    impl ScriptRunner for FakeRunner {
        fn run(&self, script: &str) -> Result<String> {
            self.scripts.lock().unwrap().push(script.to_string());
            let answers = self.answers.lock().unwrap();
            Ok(answers
                .iter()
                .find(|(needle, _)| script.contains(needle.as_str()))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_default())
        }

        fn is_running(&self, _app_name: &str) -> bool {
            self.running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeRunner;
    use super::*;

    #[test]
    fn test_parse_snapshot_spotify_units() {
        let output = "Song Name|||Artist Name|||Album Name|||180000|||12,5|||playing|||http://art.url|||80";
        let snap = parse_snapshot(output, true).unwrap();

        assert_eq!(snap.song.name, "Song Name");
        assert_eq!(snap.song.duration, 180.0);
        assert_eq!(snap.position, 12.5);
        assert_eq!(snap.state, PlayerState::Playing);
        assert_eq!(snap.artwork_url.as_deref(), Some("http://art.url"));
        assert_eq!(snap.volume, 80);
    }

    #[test]
    fn test_parse_snapshot_music_and_stopped() {
        let output = "My Song|||The Artist|||The Album|||240.5|||60.0|||paused|||NONE|||100";
        let snap = parse_snapshot(output, false).unwrap();
        assert_eq!(snap.song.duration, 240.5);
        assert_eq!(snap.state, PlayerState::Paused);
        assert_eq!(snap.artwork_url, None);

        assert!(parse_snapshot("STOPPED", false).is_none());
        assert!(parse_snapshot("garbage", false).is_none());
    }

    #[test]
    fn test_parse_raw_data() {
        assert_eq!(
            parse_raw_data("«data PNGf89504E47»"),
            Some(vec![0x89, 0x50, 0x4E, 0x47])
        );
        assert_eq!(parse_raw_data("missing value"), None);
        assert_eq!(parse_raw_data("«data PNGf895»"), None);
    }

    #[test]
    fn test_tell_refuses_stopped_player() {
        let runner = Arc::new(FakeRunner::default());
        let player = ScriptedPlayer::new(PlayerId::Spotify, runner.clone(), NotificationCenter::new());

        assert!(matches!(player.play(), Err(PlayerError::NotRunning(PlayerId::Spotify))));
        assert_eq!(player.player_state(), PlayerState::Stopped);
        assert!(runner.scripts().is_empty());
    }

    #[test]
    fn test_scrub_posts_time() {
        let runner = Arc::new(FakeRunner::running());
        let center = NotificationCenter::new();
        let mut rx = center.observe();
        let player = ScriptedPlayer::new(PlayerId::Music, runner.clone(), center);

        player.scrub(Some(0.5), true, 200.0).unwrap();

        assert_eq!(
            rx.try_recv().ok(),
            Some(PlayerNotification::Scrub { touching: true, time: 100.0 })
        );
        assert!(runner.scripts()[0].contains("set player position to 100.000"));
    }
}
