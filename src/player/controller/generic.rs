use crate::player::error::{PlayerError, Result};
use crate::player::{Artwork, PlayerHelper, PlayerId, PlayerSnapshot, PlayerState};

/// Stand-in on hosts without AppleScript: never available, refuses commands.
pub struct DummyHelper {
    id: PlayerId,
}

impl DummyHelper {
    pub fn new(id: PlayerId) -> Self {
        Self { id }
    }
}

impl PlayerHelper for DummyHelper {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn is_available(&self) -> bool {
        false
    }

    fn snapshot(&self) -> Result<Option<PlayerSnapshot>> {
        Ok(None)
    }

    fn player_state(&self) -> PlayerState {
        PlayerState::Stopped
    }

    fn playback_position(&self) -> f64 {
        0.0
    }

    fn play(&self) -> Result<()> {
        Err(PlayerError::Unsupported)
    }

    fn pause(&self) -> Result<()> {
        Err(PlayerError::Unsupported)
    }

    fn toggle_play_pause(&self) -> Result<bool> {
        Err(PlayerError::Unsupported)
    }

    fn next_track(&self) -> Result<()> {
        Err(PlayerError::Unsupported)
    }

    fn previous_track(&self) -> Result<()> {
        Err(PlayerError::Unsupported)
    }

    fn scrub(&self, _to: Option<f64>, _touching: bool) -> Result<()> {
        Err(PlayerError::Unsupported)
    }

    fn volume(&self) -> u8 {
        0
    }

    fn set_volume(&self, _volume: u8) -> Result<()> {
        Err(PlayerError::Unsupported)
    }

    fn shuffling(&self) -> bool {
        false
    }

    fn set_shuffling(&self, _enabled: bool) -> Result<()> {
        Err(PlayerError::Unsupported)
    }

    fn repeating(&self) -> bool {
        false
    }

    fn set_repeating(&self, _enabled: bool) -> Result<()> {
        Err(PlayerError::Unsupported)
    }

    fn artwork(&self) -> Artwork {
        Artwork::None
    }

    fn activate(&self) -> Result<()> {
        Err(PlayerError::Unsupported)
    }
}
