pub mod app;
pub mod artwork;
pub mod notification;
pub mod now_playing;
pub mod player;
pub mod spotify;
pub mod tracker;
pub mod ui;
pub mod watcher;
