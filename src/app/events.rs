use crossterm::event::Event;
use image::DynamicImage;

use crate::artwork::Palette;
use crate::notification::{ExternalNotification, PlayerNotification};
use crate::now_playing::RemoteCommand;

pub enum AppEvent {
    Input(Event),
    /// Synthesised track-changed notification from the watcher
    External(ExternalNotification),
    /// Internal event posted by a helper
    Player(PlayerNotification),
    Remote(RemoteCommand),
    ArtworkUpdate {
        song_key: String,
        /// Thumbnail-sized copy of the cover
        image: Option<DynamicImage>,
        palette: Option<Palette>,
        url: Option<String>,
    },
    LikeUpdate {
        song_key: String,
        liked: bool,
    },
    /// Message for the toast line
    Status(String),
    /// One second progress timer
    Progress,
    /// UI refresh tick
    Tick,
    Wake,
    Terminate,
}

impl From<ExternalNotification> for AppEvent {
    fn from(n: ExternalNotification) -> Self {
        AppEvent::External(n)
    }
}
