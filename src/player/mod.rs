pub mod controller;
pub mod error;
pub mod manager;
pub mod traits;

pub use controller::platform_helpers;
pub use error::{PlayerError, Result};
pub use manager::PlayersManager;
pub use traits::{
    Artwork, LikablePlayerHelper, PlayerHelper, PlayerId, PlayerSnapshot, PlayerState, Song,
};
