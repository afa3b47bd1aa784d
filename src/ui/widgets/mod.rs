pub mod player;
pub mod popups;
pub mod strip;
