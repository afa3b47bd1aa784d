//! Playback tracking: keeps the panel in sync with the designated player.
//!
//! The tracker reacts to three inputs: external player notifications
//! (synthesised by the [watcher](crate::watcher)), internal
//! [`PlayerNotification`]s posted by helpers after a command, and the one
//! second progress timer. Work that needs the network is handed back to the
//! runtime as [`Effect`]s.

pub mod view;

use std::sync::Arc;
use std::time::Instant;

use crate::artwork::{ArtworkRequest, Palette};
use crate::notification::{
    ExternalNotification, PlayerNotification, KEY_NAME, KEY_PLAYER_STATE,
};
use crate::now_playing::NowPlayingInfo;
use crate::player::{
    Artwork, PlayerHelper, PlayerId, PlayerState, PlayersManager, Result, Song,
};

pub use view::{
    format_time, truncate, LikeButton, NowPlayingView, PlayerAction, StripSymbol, VolumeLevel,
};

/// Work the tracker can't do synchronously.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchArtwork {
        song_key: String,
        request: ArtworkRequest,
    },
    /// Read the saved-track flag through the Web API
    RefreshRemoteLike { song_key: String, track_uri: String },
    /// Set the saved-track flag through the Web API
    SetRemoteLike { track_uri: String, liked: bool },
    /// Start the browser authorisation flow if it hasn't happened yet
    AuthorizeSpotify,
}

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Title button length on narrow panels
    pub title_max_len: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self { title_max_len: 14 }
    }
}

pub struct Tracker {
    manager: Arc<PlayersManager>,
    helper: Arc<dyn PlayerHelper>,
    settings: TrackerSettings,

    song: Song,
    view: NowPlayingView,
    artwork_url: Option<String>,
    now_playing: NowPlayingInfo,
    now_playing_dirty: bool,
    effects: Vec<Effect>,

    /// Whether the panel shows the playing state
    is_ui_playing: bool,
    /// Set while a self-originated event is in flight
    event_sent_from_app: bool,
    is_sliding: bool,
    was_playing: bool,
    /// Whether the one second progress timer runs
    tracking: bool,
    wide: bool,
}

impl Tracker {
    pub fn new(manager: Arc<PlayersManager>, settings: TrackerSettings) -> Self {
        let helper = manager.designated_helper();
        let view = NowPlayingView {
            player: Some(helper.id()),
            ..Default::default()
        };

        Self {
            manager,
            helper,
            settings,
            song: Song::default(),
            view,
            artwork_url: None,
            now_playing: NowPlayingInfo::default(),
            now_playing_dirty: false,
            effects: Vec::new(),
            is_ui_playing: false,
            event_sent_from_app: false,
            is_sliding: false,
            was_playing: false,
            tracking: false,
            wide: false,
        }
    }

    pub fn helper(&self) -> &Arc<dyn PlayerHelper> {
        &self.helper
    }

    pub fn view(&self) -> &NowPlayingView {
        &self.view
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn is_sliding(&self) -> bool {
        self.is_sliding
    }

    pub fn is_ui_playing(&self) -> bool {
        self.is_ui_playing
    }

    pub fn event_sent_from_app(&self) -> bool {
        self.event_sent_from_app
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Latest info for the system media controls, if it changed.
    pub fn take_now_playing(&mut self) -> Option<NowPlayingInfo> {
        if !self.now_playing_dirty {
            return None;
        }
        self.now_playing_dirty = false;
        Some(self.now_playing.clone())
    }

    /// Wide panels show untruncated titles.
    pub fn set_wide(&mut self, wide: bool) {
        if self.wide != wide {
            self.wide = wide;
            self.view.title_button = self.title_text(&self.song.name);
        }
    }

    /// Drops an expired last-action overlay.
    pub fn expire_action(&mut self, now: Instant) -> bool {
        self.view.expire_action(now)
    }

    // MARK: player loading

    pub fn set_player_helper(&mut self, id: PlayerId) {
        tracing::info!(player = %id, "switching player");
        self.helper = self.manager.get(id);
        self.view.player = Some(id);

        self.handle_new_song();
        self.track_song_progress();

        if id == PlayerId::Spotify {
            self.effects.push(Effect::AuthorizeSpotify);
        }
    }

    /// Full resync, run at startup and whenever the panel regains focus.
    pub fn refresh(&mut self) {
        // A blank song means the previous player went away
        if self.song == Song::default() || !self.helper.is_available() {
            self.set_player_helper(self.manager.designated_helper_id());
        }

        if !self.helper.is_playing() {
            self.sync_song_progress_slider();
        }

        self.prepare_sound_slider();
        self.update_shuffle_repeat();
        self.prepare_song();
        self.update_control_strip();
        self.update_like_button(None);
    }

    /// The panel lost focus.
    pub fn resign(&mut self) {
        self.event_sent_from_app = false;
    }

    /// The system woke from sleep; timers and views may be stale.
    pub fn handle_wake(&mut self) {
        tracing::debug!("wake");
        self.view.last_action = None;
        self.refresh();
    }

    fn prepare_song(&mut self) {
        self.song = self.helper.song();
        self.update_after_notification(true);
        self.track_song_progress();
        self.helper.update_player();
    }

    fn prepare_sound_slider(&mut self) {
        let volume = self.helper.volume();
        self.view.volume = volume;
        self.view.volume_level = VolumeLevel::from_volume(volume);
    }

    fn update_shuffle_repeat(&mut self) {
        self.view.shuffling = self.helper.shuffling();
        self.view.repeating = self.helper.repeating();
    }

    // MARK: external notifications

    /// Whether `n` says the player is quitting rather than changing state.
    pub fn is_closing(&self, n: &ExternalNotification) -> bool {
        if n.name == PlayerId::Spotify.track_changed_notification() {
            // A quitting Spotify only sends its stopped state
            return n.user_info.len() < 2;
        }

        if n.name == PlayerId::Music.track_changed_notification() {
            // Music always sends a full payload, so a closing one looks
            // exactly like what the panel already shows
            return match (n.get(KEY_NAME), n.get(KEY_PLAYER_STATE)) {
                (Some(name), Some(state)) => {
                    name == self.song.name
                        && (state == PlayerState::Playing.as_str()) == self.is_ui_playing
                }
                _ => n.user_info.len() < 2,
            };
        }

        false
    }

    pub fn handle_external_notification(&mut self, n: &ExternalNotification) {
        tracing::debug!(name = %n.name, info = ?n.user_info, "player notification");

        if self.is_closing(n) {
            self.handle_closing();
            return;
        }

        // Another player took over
        if self.manager.id_for_notification(&n.name) != Some(self.helper.id()) {
            self.set_player_helper(self.manager.designated_helper_id());
            return;
        }

        if self.should_load_song() {
            self.handle_new_song();
        } else {
            self.handle_play_pause();
        }

        self.track_song_progress();
        self.event_sent_from_app = false;
    }

    fn should_load_song(&self) -> bool {
        // Only a different track needs a full reload
        self.helper.song().name != self.song.name
    }

    fn handle_closing(&mut self) {
        tracing::info!(player = %self.helper.id(), "player closed");
        self.reset_song();
    }

    pub fn reset_song(&mut self) {
        self.song = Song::default();
        self.view.song = Song::default();
        self.view.title_button.clear();
        self.view.palette = None;
        self.artwork_url = None;
        self.tracking = false;
        self.update_song_progress_slider(Some(0.0));
        self.update_control_strip();
    }

    fn handle_new_song(&mut self) {
        self.song = self.helper.song();
        tracing::info!(song = %self.song.name, artist = %self.song.artist, "new song");

        self.update_song_progress_slider(None);
        self.update_after_notification(true);
    }

    fn handle_play_pause(&mut self) {
        self.update_controls_after_play_pause();
        self.update_playback_state();
        let position = self.helper.playback_position();
        self.update_now_playing_elapsed(position);
        self.update_control_strip();
    }

    // MARK: internal notifications

    pub fn handle_player_notification(&mut self, event: &PlayerNotification) {
        self.handle_player_notification_at(event, Instant::now());
    }

    pub fn handle_player_notification_at(&mut self, event: &PlayerNotification, now: Instant) {
        self.event_sent_from_app = true;

        match *event {
            PlayerNotification::Play => {
                self.view.show_action(PlayerAction::Play, now);
                self.play_pause_handler();
            }
            PlayerNotification::Pause => {
                self.view.show_action(PlayerAction::Pause, now);
                self.play_pause_handler();
            }
            PlayerNotification::Next => {
                self.view.show_action(PlayerAction::Next, now);
                self.track_changed_handler();
            }
            PlayerNotification::Previous => {
                self.view.show_action(PlayerAction::Previous, now);
                self.track_changed_handler();
            }
            PlayerNotification::Scrub { touching, time } => {
                self.time_changed_handler(touching, time);
            }
            PlayerNotification::Shuffling(enabled) => self.view.shuffling = enabled,
            PlayerNotification::Repeating(enabled) => self.view.repeating = enabled,
            PlayerNotification::Like(liked) => self.update_like_button(Some(liked)),
        }

        // These never come back as a player notification
        if matches!(
            event,
            PlayerNotification::Scrub { .. }
                | PlayerNotification::Shuffling(_)
                | PlayerNotification::Repeating(_)
                | PlayerNotification::Like(_)
        ) {
            self.event_sent_from_app = false;
        }
    }

    fn play_pause_handler(&mut self) {
        if !self.helper.does_send_play_pause_notification() {
            self.handle_play_pause();
            self.track_song_progress();
        }
    }

    fn track_changed_handler(&mut self) {
        self.update_song_progress_slider(Some(0.0));
        self.update_now_playing_info();
    }

    fn time_changed_handler(&mut self, touching: bool, time: f64) {
        self.view.time_info = touching.then(|| format_time(time));
        self.update_song_progress_slider(Some(time));
        // Keeps the timer from snapping the slider back mid-gesture
        self.is_sliding = touching;
    }

    // MARK: slider gestures

    pub fn touches_began(&mut self, value: f64) -> Result<()> {
        self.view.progress = value.clamp(0.0, 1.0);
        self.was_playing = self.helper.is_playing();
        self.helper.scrub(Some(self.view.progress), false)
    }

    pub fn touches_moved(&mut self, value: f64) -> Result<()> {
        self.view.progress = value.clamp(0.0, 1.0);
        // A playing player fights the slider
        if self.helper.is_playing() {
            self.helper.pause()?;
        }
        self.helper.scrub(Some(self.view.progress), true)
    }

    pub fn touches_ended(&mut self, value: f64) -> Result<()> {
        self.view.progress = value.clamp(0.0, 1.0);
        self.helper.scrub(Some(self.view.progress), false)?;
        if self.was_playing {
            self.helper.play()?;
        }
        Ok(())
    }

    pub fn touches_cancelled(&mut self, value: f64) -> Result<()> {
        self.touches_ended(value)
    }

    // MARK: progress tracking

    pub fn track_song_progress(&mut self) {
        self.tracking = false;

        if self.helper.is_playing() {
            self.tracking = true;
        } else {
            self.sync_song_progress_slider();
        }
    }

    /// Timer body.
    pub fn tick(&mut self) {
        self.sync_song_progress_slider();
    }

    fn sync_song_progress_slider(&mut self) {
        if self.helper.player_state() == PlayerState::Stopped {
            self.reset_song();
            return;
        }
        if !self.is_sliding {
            self.update_song_progress_slider(None);
        }
    }

    /// `position` in seconds; `None` reads it from the player.
    pub fn update_song_progress_slider(&mut self, position: Option<f64>) {
        if !self.helper.does_send_play_pause_notification()
            && self.is_ui_playing != self.helper.is_playing()
        {
            // Nobody tells us about play/pause, so poll for it
            self.handle_play_pause();
        }

        let player_position = position.unwrap_or_else(|| self.helper.playback_position());

        if self.song.duration == 0.0 && player_position > self.song.duration {
            // Song metadata wasn't ready when it was loaded
            self.song = self.helper.song();
            self.view.song = self.song.clone();
        }

        self.view.elapsed = player_position;
        self.view.progress = if self.song.duration > 0.0 {
            (player_position / self.song.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if self.is_ui_playing {
            self.update_control_strip();
        }

        self.update_now_playing_elapsed(player_position);
    }

    fn update_controls_after_play_pause(&mut self) {
        self.is_ui_playing = self.helper.is_playing();
        self.view.playing = self.is_ui_playing;
    }

    // MARK: transport

    pub fn play(&mut self) -> Result<()> {
        self.helper.play()
    }

    pub fn pause(&mut self) -> Result<()> {
        self.helper.pause()
    }

    pub fn toggle_play_pause(&mut self) -> Result<()> {
        self.helper.toggle_play_pause().map(|_| ())
    }

    pub fn next_track(&mut self) -> Result<()> {
        self.helper.next_track()
    }

    pub fn previous_track(&mut self) -> Result<()> {
        self.helper.previous_track()
    }

    /// Remote "set position" command, in seconds.
    pub fn seek_to(&mut self, seconds: f64) -> Result<()> {
        if self.song.duration <= 0.0 {
            return Ok(());
        }
        self.helper
            .scrub(Some(seconds / self.song.duration), false)
    }

    /// Tap on the control strip button.
    pub fn strip_tap(&mut self) -> Result<()> {
        self.toggle_play_pause()
    }

    /// Horizontal swipe on the control strip button.
    pub fn strip_swipe(&mut self, dx: f64) -> Result<()> {
        if dx < 0.0 {
            self.previous_track()
        } else {
            self.next_track()
        }
    }

    pub fn show_player(&self) -> Result<()> {
        self.helper.activate()
    }

    // MARK: volume, shuffle, repeat

    pub fn set_volume(&mut self, volume: u8) -> Result<()> {
        let volume = volume.min(100);
        self.helper.set_volume(volume)?;
        self.view.volume = volume;
        self.view.volume_level = VolumeLevel::from_volume(volume);
        Ok(())
    }

    pub fn change_volume(&mut self, delta: i16) -> Result<()> {
        let volume = (self.view.volume as i16 + delta).clamp(0, 100) as u8;
        self.set_volume(volume)
    }

    pub fn toggle_shuffle(&mut self) -> Result<()> {
        self.helper.set_shuffling(!self.view.shuffling)
    }

    pub fn toggle_repeat(&mut self) -> Result<()> {
        self.helper.set_repeating(!self.view.repeating)
    }

    // MARK: like

    pub fn toggle_like(&mut self) -> Result<()> {
        if self.helper.id() == PlayerId::Spotify {
            if let Some(track_uri) = self.helper.track_uri() {
                self.effects.push(Effect::SetRemoteLike {
                    track_uri,
                    liked: !self.view.like.liked,
                });
            }
            return Ok(());
        }

        if let Some(likable) = self.helper.as_likable() {
            likable.toggle_liked()?;
        }
        Ok(())
    }

    fn update_like_button(&mut self, new_value: Option<bool>) {
        if let Some(liked) = new_value {
            self.view.like.liked = liked;
            return;
        }

        if self.helper.id() == PlayerId::Spotify {
            self.view.like.enabled = true;
            // Saved status comes from the Web API
            if let Some(track_uri) = self.helper.track_uri() {
                self.effects.push(Effect::RefreshRemoteLike {
                    song_key: self.song.key(),
                    track_uri,
                });
            }
        } else if let Some(likable) = self.helper.as_likable() {
            self.view.like.enabled = true;
            self.view.like.liked = likable.liked().unwrap_or(false);
        } else {
            self.view.like.enabled = false;
            self.view.like.liked = true;
        }
    }

    /// Result of [`Effect::RefreshRemoteLike`].
    pub fn apply_remote_like(&mut self, song_key: &str, liked: bool) {
        if song_key == self.song.key() {
            self.view.like.liked = liked;
        }
    }

    // MARK: title button

    fn title_text(&self, text: &str) -> String {
        if self.wide {
            text.to_string()
        } else {
            truncate(text, self.settings.title_max_len)
        }
    }

    /// Swipe on the title button: right shows the song, left the artist.
    pub fn swipe_title(&mut self, dx: f64) {
        let text = if dx > 0.0 {
            self.song.name.clone()
        } else {
            self.song.artist.clone()
        };
        self.view.title_button = self.title_text(&text);
    }

    // MARK: UI refresh

    fn update_control_strip(&mut self) {
        self.view.strip = StripSymbol::for_state(self.song.is_valid(), self.helper.is_playing());
    }

    fn update_after_notification(&mut self, update_now_playing: bool) {
        self.is_ui_playing = self.helper.is_playing();
        self.update_panel();

        if update_now_playing {
            self.update_now_playing_info();
        }
    }

    fn update_panel(&mut self) {
        self.view.song = self.song.clone();
        self.view.title_button = self.title_text(&self.song.name);
        self.view.playing = self.is_ui_playing;

        self.fetch_artwork();
        self.update_like_button(None);
    }

    fn fetch_artwork(&mut self) {
        let request = match self.helper.artwork() {
            Artwork::Url(url) => {
                self.artwork_url = Some(url.clone());
                ArtworkRequest::Url(url)
            }
            Artwork::Bytes(bytes) => ArtworkRequest::Bytes(bytes),
            // No cover, but enough info to look one up
            Artwork::None if self.song.is_valid() => ArtworkRequest::Search {
                artist: self.song.artist.clone(),
                album: self.song.album.clone(),
            },
            Artwork::None => {
                self.artwork_url = None;
                self.view.palette = None;
                return;
            }
        };

        self.effects.push(Effect::FetchArtwork {
            song_key: self.song.key(),
            request,
        });
    }

    /// Result of [`Effect::FetchArtwork`]; dropped when the song moved on.
    pub fn apply_artwork(&mut self, song_key: &str, palette: Option<Palette>, url: Option<String>) {
        if song_key != self.song.key() {
            return;
        }
        self.view.palette = palette;
        if url.is_some() && self.artwork_url != url {
            self.artwork_url = url;
            self.update_now_playing_info();
        }
    }

    // MARK: now playing

    fn update_now_playing_info(&mut self) {
        self.now_playing = NowPlayingInfo {
            title: self.song.name.clone(),
            artist: self.song.artist.clone(),
            album: self.song.album.clone(),
            duration: self.song.duration,
            elapsed: self.view.elapsed,
            playing: self.is_ui_playing,
            artwork_url: self.artwork_url.clone(),
        };
        self.now_playing_dirty = true;
    }

    fn update_playback_state(&mut self) {
        self.now_playing.playing = self.is_ui_playing;
        self.now_playing_dirty = true;
    }

    fn update_now_playing_elapsed(&mut self, position: f64) {
        self.now_playing.elapsed = position;
        self.now_playing.playing = self.is_ui_playing;
        self.now_playing_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn tracker() -> Tracker {
        let manager = Arc::new(PlayersManager::new(Vec::new(), PlayerId::Music));
        Tracker::new(manager, TrackerSettings::default())
    }

    fn notification(id: PlayerId, pairs: &[(&str, &str)]) -> ExternalNotification {
        ExternalNotification {
            name: id.track_changed_notification().to_string(),
            user_info: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_spotify_closing_payload() {
        let tracker = tracker();
        let stopped = notification(PlayerId::Spotify, &[(KEY_PLAYER_STATE, "Stopped")]);
        let playing = notification(
            PlayerId::Spotify,
            &[(KEY_NAME, "Song"), (KEY_PLAYER_STATE, "Playing")],
        );

        assert!(tracker.is_closing(&stopped));
        assert!(!tracker.is_closing(&playing));
    }

    #[test]
    fn test_music_closing_payload() {
        let mut tracker = tracker();
        tracker.song.name = "Song".into();
        tracker.is_ui_playing = false;

        // Same song, same state: Music is going away
        let echo = notification(
            PlayerId::Music,
            &[(KEY_NAME, "Song"), (KEY_PLAYER_STATE, "Paused")],
        );
        assert!(tracker.is_closing(&echo));

        let resumed = notification(
            PlayerId::Music,
            &[(KEY_NAME, "Song"), (KEY_PLAYER_STATE, "Playing")],
        );
        assert!(!tracker.is_closing(&resumed));

        let bare = notification(PlayerId::Music, &[(KEY_PLAYER_STATE, "Stopped")]);
        assert!(tracker.is_closing(&bare));
    }

    #[test]
    fn test_unknown_notification_never_closes() {
        let tracker = tracker();
        let other = ExternalNotification {
            name: "com.example.player".into(),
            user_info: BTreeMap::new(),
        };
        assert!(!tracker.is_closing(&other));
    }

    #[test]
    fn test_swipe_title_switches_text() {
        let mut tracker = tracker();
        tracker.song = Song {
            name: "A Very Long Song Title".into(),
            artist: "Artist".into(),
            album: String::new(),
            duration: 100.0,
        };

        tracker.swipe_title(-1.0);
        assert_eq!(tracker.view().title_button, "Artist");

        tracker.swipe_title(1.0);
        assert_eq!(tracker.view().title_button, "A Very Long S…");

        tracker.set_wide(true);
        tracker.swipe_title(1.0);
        assert_eq!(tracker.view().title_button, "A Very Long Song Title");
    }

    #[test]
    fn test_scrub_notification_sets_time_info() {
        let mut tracker = tracker();
        tracker.song.duration = 200.0;

        tracker.handle_player_notification(&PlayerNotification::Scrub {
            touching: true,
            time: 50.0,
        });
        assert!(tracker.is_sliding());
        assert_eq!(tracker.view().time_info.as_deref(), Some("00:50"));
        assert_eq!(tracker.view().progress, 0.25);
        assert!(!tracker.event_sent_from_app());

        tracker.handle_player_notification(&PlayerNotification::Scrub {
            touching: false,
            time: 60.0,
        });
        assert!(!tracker.is_sliding());
        assert!(tracker.view().time_info.is_none());
    }

    #[test]
    fn test_transport_notification_shows_overlay() {
        let mut tracker = tracker();
        let now = Instant::now();

        tracker.handle_player_notification_at(&PlayerNotification::Next, now);

        assert_eq!(tracker.view().visible_action(now), Some(PlayerAction::Next));
        assert!(tracker.event_sent_from_app());
        assert!(tracker.take_now_playing().is_some());
        assert!(tracker.take_now_playing().is_none());
    }

    #[test]
    fn test_tick_on_stopped_player_resets() {
        let mut tracker = tracker();
        tracker.song = Song {
            name: "Gone".into(),
            artist: String::new(),
            album: String::new(),
            duration: 10.0,
        };
        tracker.tracking = true;

        tracker.tick();

        assert_eq!(tracker.song(), &Song::default());
        assert!(!tracker.is_tracking());
        assert_eq!(tracker.view().strip, StripSymbol::Music);
    }

    #[test]
    fn test_like_button_disabled_for_unlikable_player() {
        let mut tracker = tracker();
        tracker.update_like_button(None);
        assert_eq!(tracker.view().like, LikeButton::default());
    }
}
