pub mod auth;
pub mod cli;
pub mod config;
pub mod events;
pub mod inputs;
pub mod keys;
pub mod lock;
pub mod logging;
pub mod runtime;
pub mod state;

pub use state::*;
