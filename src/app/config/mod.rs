use std::fs;
use std::path::PathBuf;

pub mod persistence;
pub mod user;

pub use persistence::{PersistentState, StateFile};
pub use user::UserConfig;

pub struct AppConfig;

impl AppConfig {
    pub fn get_config_dir() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let xdg_dir = home.join(".config").join("musebar");

        if !xdg_dir.exists() {
            let _ = fs::create_dir_all(&xdg_dir);
        }

        xdg_dir
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    pub fn get_state_path() -> PathBuf {
        Self::get_config_dir().join("state.toml")
    }

    pub fn get_lock_path() -> PathBuf {
        Self::get_config_dir().join("musebar.pid")
    }

    pub fn get_log_dir() -> PathBuf {
        Self::get_config_dir().join("logs")
    }

    /// Loads both files, creating `config.toml` with defaults when missing.
    pub fn load() -> (UserConfig, PersistentState) {
        let config_path = Self::get_config_path();

        let user_config = match fs::read_to_string(&config_path) {
            Ok(content) => Self::parse_user_config(&content),
            Err(_) => {
                let c = UserConfig::default();
                if let Ok(content) = toml::to_string_pretty(&c) {
                    let _ = fs::write(&config_path, content);
                }
                c
            }
        };

        let state = PersistentState::load_from(&Self::get_state_path());

        (user_config, state)
    }

    pub fn parse_user_config(content: &str) -> UserConfig {
        toml::from_str(content).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "malformed config.toml, using defaults");
            UserConfig::default()
        })
    }

    pub fn default_config_toml() -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(&UserConfig::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_config_uses_defaults() {
        let config = AppConfig::parse_user_config("poll_interval_ms = \"fast\"");
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn test_generated_config_parses() {
        let text = AppConfig::default_config_toml().unwrap();
        assert!(text.contains("default_player = \"music\""));
        let config = AppConfig::parse_user_config(&text);
        assert_eq!(config.title_length, 14);
    }
}
