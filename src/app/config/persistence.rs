use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::player::PlayerId;
use crate::spotify::{SpotifyTokens, TokenStore};

/// Automatically saved session state, stored in `state.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistentState {
    #[serde(default)]
    pub last_player: Option<PlayerId>,
    #[serde(default)]
    pub spotify_tokens: Option<SpotifyTokens>,
}

impl PersistentState {
    pub fn load_from(path: &PathBuf) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "malformed state file, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &PathBuf) {
        match toml::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to save state");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialise state"),
        }
    }
}

/// Keeps Spotify tokens in `state.toml`.
///
/// The file is re-read on every load so tokens saved by a `--open-url`
/// invocation reach the running instance.
pub struct StateFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Read-modify-write of the state file.
    pub fn update(&self, f: impl FnOnce(&mut PersistentState)) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut state = PersistentState::load_from(&self.path);
        f(&mut state);
        state.save_to(&self.path);
    }
}

impl TokenStore for StateFile {
    fn load(&self) -> Option<SpotifyTokens> {
        PersistentState::load_from(&self.path).spotify_tokens
    }

    fn save(&self, tokens: &SpotifyTokens) {
        let tokens = tokens.clone();
        self.update(|state| state.spotify_tokens = Some(tokens));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("musebar-{}-{name}.toml", std::process::id()))
    }

    #[test]
    fn test_state_file_keeps_tokens_and_player() {
        let path = temp_path("state");
        let store = StateFile::new(path.clone());
        assert!(store.load().is_none());

        store.update(|s| s.last_player = Some(PlayerId::Spotify));
        let tokens = SpotifyTokens {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: 42,
        };
        store.save(&tokens);

        let state = PersistentState::load_from(&path);
        assert_eq!(state.last_player, Some(PlayerId::Spotify));
        assert_eq!(store.load(), Some(tokens));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_malformed_state_falls_back() {
        let path = temp_path("malformed");
        fs::write(&path, "last_player = 12").unwrap();
        assert_eq!(PersistentState::load_from(&path), PersistentState::default());
        let _ = fs::remove_file(path);
    }
}
