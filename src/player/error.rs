use thiserror::Error;

use super::PlayerId;

pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to run osascript: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("AppleScript error: {0}")]
    Script(String),

    #[error("{0} is not running")]
    NotRunning(PlayerId),

    #[error("controller mode not supported on this OS")]
    Unsupported,
}
