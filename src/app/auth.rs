use std::sync::Arc;

use anyhow::{Context, Result};

use crate::app::config::{AppConfig, StateFile};
use crate::player::PlayerId;
use crate::spotify::{authorization_code, SpotifyApi};

/// Handles a `muse://callback?code=...` URL from the Spotify authorisation
/// page. The tokens land in `state.toml`, where a running instance picks
/// them up.
pub async fn handle_open_url(url: &str) -> Result<()> {
    let (config, state) = AppConfig::load();
    let code = authorization_code(url)?;

    if state.last_player != Some(PlayerId::Spotify) {
        tracing::info!("ignoring authorisation callback, Spotify isn't the current player");
        return Ok(());
    }

    let store = Arc::new(StateFile::new(AppConfig::get_state_path()));
    let api = SpotifyApi::new(reqwest::Client::new(), config.spotify, store);
    api.save_token(&code)
        .await
        .context("Spotify token exchange failed")?;

    tracing::info!("Spotify authorised");
    println!("Spotify authorised.");
    Ok(())
}

/// Opens the Spotify consent page in the browser.
pub fn open_authorization_page(api: &SpotifyApi) -> Result<()> {
    let url = api.credentials().authorization_url()?;
    tracing::info!(%url, "opening Spotify authorisation");

    let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
    std::process::Command::new(opener)
        .arg(&url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("failed to run {opener}"))?;
    Ok(())
}
