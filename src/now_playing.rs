//! Bridge to the OS media controls (Now Playing on macOS, MPRIS on Linux).

use std::time::Duration;

use anyhow::{anyhow, Result};
use souvlaki::{
    MediaControlEvent, MediaControls, MediaMetadata, MediaPlayback, MediaPosition, PlatformConfig,
};
use tokio::sync::mpsc;

/// What the media controls show. Times are in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NowPlayingInfo {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: f64,
    pub elapsed: f64,
    pub playing: bool,
    pub artwork_url: Option<String>,
}

impl NowPlayingInfo {
    fn same_metadata(&self, other: &Self) -> bool {
        self.title == other.title
            && self.artist == other.artist
            && self.album == other.album
            && self.duration == other.duration
            && self.artwork_url == other.artwork_url
    }
}

/// Commands coming from headphones, media keys or the system widget.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCommand {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    /// Seconds from the start of the song
    SetPosition(f64),
    Raise,
}

impl RemoteCommand {
    pub fn from_event(event: MediaControlEvent) -> Option<Self> {
        match event {
            MediaControlEvent::Play => Some(RemoteCommand::Play),
            MediaControlEvent::Pause => Some(RemoteCommand::Pause),
            MediaControlEvent::Toggle => Some(RemoteCommand::Toggle),
            MediaControlEvent::Next => Some(RemoteCommand::Next),
            MediaControlEvent::Previous => Some(RemoteCommand::Previous),
            MediaControlEvent::SetPosition(MediaPosition(position)) => {
                Some(RemoteCommand::SetPosition(position.as_secs_f64()))
            }
            MediaControlEvent::Raise => Some(RemoteCommand::Raise),
            _ => None,
        }
    }
}

pub struct NowPlaying {
    controls: MediaControls,
    published: Option<NowPlayingInfo>,
}

impl NowPlaying {
    /// Registers with the OS; remote commands are forwarded to `tx`.
    pub fn start(tx: mpsc::UnboundedSender<RemoteCommand>) -> Result<Self> {
        let config = PlatformConfig {
            dbus_name: "musebar",
            display_name: "musebar",
            hwnd: None,
        };

        let mut controls =
            MediaControls::new(config).map_err(|e| anyhow!("media controls: {e:?}"))?;
        controls
            .attach(move |event: MediaControlEvent| {
                tracing::debug!(?event, "remote command");
                if let Some(command) = RemoteCommand::from_event(event) {
                    let _ = tx.send(command);
                }
            })
            .map_err(|e| anyhow!("media controls attach: {e:?}"))?;

        Ok(Self {
            controls,
            published: None,
        })
    }

    pub fn publish(&mut self, info: &NowPlayingInfo) -> Result<()> {
        let metadata_changed = self
            .published
            .as_ref()
            .map_or(true, |published| !published.same_metadata(info));

        if metadata_changed {
            let metadata = MediaMetadata {
                title: Some(info.title.as_str()).filter(|s| !s.is_empty()),
                artist: Some(info.artist.as_str()).filter(|s| !s.is_empty()),
                album: Some(info.album.as_str()).filter(|s| !s.is_empty()),
                cover_url: info.artwork_url.as_deref(),
                duration: (info.duration > 0.0).then(|| Duration::from_secs_f64(info.duration)),
            };
            self.controls
                .set_metadata(metadata)
                .map_err(|e| anyhow!("set metadata: {e:?}"))?;
        }

        self.controls
            .set_playback(playback(info))
            .map_err(|e| anyhow!("set playback: {e:?}"))?;

        self.published = Some(info.clone());
        Ok(())
    }
}

fn playback(info: &NowPlayingInfo) -> MediaPlayback {
    if info.title.is_empty() {
        return MediaPlayback::Stopped;
    }

    let progress = Some(MediaPosition(Duration::from_secs_f64(info.elapsed.max(0.0))));
    if info.playing {
        MediaPlayback::Playing { progress }
    } else {
        MediaPlayback::Paused { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_commands() {
        assert_eq!(
            RemoteCommand::from_event(MediaControlEvent::Toggle),
            Some(RemoteCommand::Toggle)
        );
        assert_eq!(
            RemoteCommand::from_event(MediaControlEvent::SetPosition(MediaPosition(
                Duration::from_millis(61_500)
            ))),
            Some(RemoteCommand::SetPosition(61.5))
        );
        assert_eq!(RemoteCommand::from_event(MediaControlEvent::Quit), None);
    }

    #[test]
    fn test_playback_state() {
        let mut info = NowPlayingInfo::default();
        assert!(matches!(playback(&info), MediaPlayback::Stopped));

        info.title = "Song".into();
        info.elapsed = 12.0;
        assert!(matches!(playback(&info), MediaPlayback::Paused { .. }));

        info.playing = true;
        assert!(matches!(
            playback(&info),
            MediaPlayback::Playing { progress: Some(MediaPosition(p)) } if p == Duration::from_secs(12)
        ));
    }

    #[test]
    fn test_metadata_ignores_elapsed() {
        let a = NowPlayingInfo {
            title: "Song".into(),
            elapsed: 1.0,
            ..Default::default()
        };
        let b = NowPlayingInfo {
            elapsed: 30.0,
            playing: true,
            ..a.clone()
        };
        assert!(a.same_metadata(&b));
    }
}
