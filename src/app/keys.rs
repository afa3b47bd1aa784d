use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Key bindings, one key name per action. Names are single characters or
/// one of `Space`, `Enter`, `Esc`, `Tab`, `Up`, `Down`, `Left`, `Right`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub quit: String,
    pub play_pause: String,
    pub next_track: String,
    pub prev_track: String,
    pub volume_up: String,
    pub volume_down: String,

    // Scrubbing
    pub seek_forward: String,
    pub seek_forward_alt: String,
    pub seek_backward: String,
    pub seek_backward_alt: String,

    pub shuffle: String,
    pub repeat: String,
    pub like: String,

    // Title button swipes
    pub title_artist: String,
    pub title_song: String,

    pub show_player: String,
    pub wake: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            play_pause: "Space".to_string(),
            next_track: "n".to_string(),
            prev_track: "p".to_string(),
            volume_up: "+".to_string(),
            volume_down: "-".to_string(),

            seek_forward: "Right".to_string(),
            seek_forward_alt: ".".to_string(),
            seek_backward: "Left".to_string(),
            seek_backward_alt: "h".to_string(),

            shuffle: "s".to_string(),
            repeat: "r".to_string(),
            like: "l".to_string(),

            title_artist: "[".to_string(),
            title_song: "]".to_string(),

            show_player: "o".to_string(),
            wake: "w".to_string(),
        }
    }
}

impl KeyConfig {
    pub fn matches(&self, event: KeyEvent, key_str: &str) -> bool {
        match key_str {
            "Space" => event.code == KeyCode::Char(' '),
            "Enter" => event.code == KeyCode::Enter,
            "Esc" => event.code == KeyCode::Esc,
            "Tab" => event.code == KeyCode::Tab,
            "Up" => event.code == KeyCode::Up,
            "Down" => event.code == KeyCode::Down,
            "Left" => event.code == KeyCode::Left,
            "Right" => event.code == KeyCode::Right,
            s if s.chars().count() == 1 => match s.chars().next() {
                // Shifted letters may arrive lowercase with SHIFT set
                Some(ch) if ch.is_uppercase() => {
                    event.code == KeyCode::Char(ch)
                        || (event.code == KeyCode::Char(ch.to_ascii_lowercase())
                            && event.modifiers.contains(KeyModifiers::SHIFT))
                }
                Some(ch) => event.code == KeyCode::Char(ch),
                None => false,
            },
            _ => false,
        }
    }

    /// Label for the help line.
    pub fn display(&self, key_str: &str) -> String {
        match key_str {
            "Space" => "␣".to_string(),
            "Up" => "↑".to_string(),
            "Down" => "↓".to_string(),
            "Left" => "←".to_string(),
            "Right" => "→".to_string(),
            _ => key_str.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_named_and_char_keys() {
        let keys = KeyConfig::default();
        assert!(keys.matches(key(KeyCode::Char(' ')), &keys.play_pause));
        assert!(keys.matches(key(KeyCode::Left), &keys.seek_backward));
        assert!(keys.matches(key(KeyCode::Char('[')), &keys.title_artist));
        assert!(!keys.matches(key(KeyCode::Char('x')), &keys.quit));
    }

    #[test]
    fn test_uppercase_with_shift() {
        let keys = KeyConfig::default();
        let shifted = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::SHIFT);
        assert!(keys.matches(shifted, "L"));
        assert!(!keys.matches(key(KeyCode::Char('l')), "L"));
    }
}
