//! Spotify Web API access for the bits AppleScript can't reach
//! (saved-track status) and the OAuth flow behind it.

pub mod api;
pub mod auth;

pub use api::SpotifyApi;
pub use auth::{authorization_code, SpotifyCredentials, SpotifyTokens, TokenStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify is not authorised yet")]
    Unauthorized,

    #[error("Spotify client credentials are not configured")]
    MissingCredentials,

    #[error("no authorisation code in {0}")]
    MissingCode(String),

    #[error("invalid url: {0}")]
    Url(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("not a Spotify track id: {0}")]
    TrackId(String),
}
