use std::time::{Duration, Instant};

use crate::artwork::Palette;
use crate::player::{PlayerId, Song};

/// How long the last-action glyph stays on screen
pub const ACTION_VIEW_TIMEOUT: Duration = Duration::from_millis(750);

/// Glyph on the control strip button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StripSymbol {
    #[default]
    Music,
    Play,
    Pause,
}

impl StripSymbol {
    pub fn for_state(song_valid: bool, playing: bool) -> Self {
        match (song_valid, playing) {
            (true, true) => StripSymbol::Pause,
            (true, false) => StripSymbol::Play,
            _ => StripSymbol::Music,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            StripSymbol::Music => "♫",
            StripSymbol::Play => "▶",
            StripSymbol::Pause => "⏸",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolumeLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl VolumeLevel {
    pub fn from_volume(volume: u8) -> Self {
        if volume > 70 {
            VolumeLevel::High
        } else if volume > 30 {
            VolumeLevel::Medium
        } else {
            VolumeLevel::Low
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            VolumeLevel::Low => "🔈",
            VolumeLevel::Medium => "🔉",
            VolumeLevel::High => "🔊",
        }
    }
}

/// Transport actions echoed by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Play,
    Pause,
    Previous,
    Next,
}

impl PlayerAction {
    pub fn glyph(self) -> &'static str {
        match self {
            PlayerAction::Play => "▶",
            PlayerAction::Pause => "⏸",
            PlayerAction::Previous => "⏮",
            PlayerAction::Next => "⏭",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeButton {
    pub enabled: bool,
    pub liked: bool,
}

impl Default for LikeButton {
    fn default() -> Self {
        Self {
            enabled: false,
            liked: true,
        }
    }
}

/// Everything the panel draws. Mutated only by the tracker.
#[derive(Debug, Clone, Default)]
pub struct NowPlayingView {
    pub player: Option<PlayerId>,
    pub song: Song,
    /// Text of the artwork/title button
    pub title_button: String,
    pub playing: bool,
    /// Slider value in [0, 1]
    pub progress: f64,
    /// Seconds
    pub elapsed: f64,
    /// Shown next to the knob while scrubbing
    pub time_info: Option<String>,
    pub shuffling: bool,
    pub repeating: bool,
    pub like: LikeButton,
    pub volume: u8,
    pub volume_level: VolumeLevel,
    pub strip: StripSymbol,
    pub palette: Option<Palette>,
    pub last_action: Option<(PlayerAction, Instant)>,
}

impl NowPlayingView {
    pub fn show_action(&mut self, action: PlayerAction, now: Instant) {
        self.last_action = Some((action, now));
    }

    /// Action still on screen at `now`
    pub fn visible_action(&self, now: Instant) -> Option<PlayerAction> {
        self.last_action
            .filter(|(_, shown)| now.duration_since(*shown) < ACTION_VIEW_TIMEOUT)
            .map(|(action, _)| action)
    }

    /// Drops an expired overlay; returns whether anything changed.
    pub fn expire_action(&mut self, now: Instant) -> bool {
        if self.last_action.is_some() && self.visible_action(now).is_none() {
            self.last_action = None;
            return true;
        }
        false
    }
}

/// `mm:ss` for the scrub label.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Truncates to `max` characters, appending "…" when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_symbol() {
        assert_eq!(StripSymbol::for_state(true, true), StripSymbol::Pause);
        assert_eq!(StripSymbol::for_state(true, false), StripSymbol::Play);
        assert_eq!(StripSymbol::for_state(false, true), StripSymbol::Music);
    }

    #[test]
    fn test_volume_levels() {
        assert_eq!(VolumeLevel::from_volume(71), VolumeLevel::High);
        assert_eq!(VolumeLevel::from_volume(70), VolumeLevel::Medium);
        assert_eq!(VolumeLevel::from_volume(31), VolumeLevel::Medium);
        assert_eq!(VolumeLevel::from_volume(30), VolumeLevel::Low);
    }

    #[test]
    fn test_action_overlay_expires() {
        let mut view = NowPlayingView::default();
        let start = Instant::now();
        view.show_action(PlayerAction::Next, start);

        assert_eq!(view.visible_action(start), Some(PlayerAction::Next));
        assert!(!view.expire_action(start + Duration::from_millis(100)));
        assert!(view.expire_action(start + ACTION_VIEW_TIMEOUT));
        assert!(view.last_action.is_none());
    }

    #[test]
    fn test_truncate_and_time() {
        assert_eq!(truncate("Bohemian Rhapsody", 14), "Bohemian Rhap…");
        assert_eq!(truncate("Short", 14), "Short");
        assert_eq!(format_time(125.9), "02:05");
        assert_eq!(format_time(-3.0), "00:00");
    }
}
