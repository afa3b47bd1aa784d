pub mod common;
pub mod music;
pub mod spotify;

pub use common::Osascript;
pub use music::MusicHelper;
pub use spotify::SpotifyHelper;
