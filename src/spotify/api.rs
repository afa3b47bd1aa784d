use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

use super::auth::{now_secs, SpotifyCredentials, SpotifyTokens, TokenStore, TOKEN_URL};
use super::SpotifyError;

const API_BASE: &str = "https://api.spotify.com/v1";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    refresh_token: Option<String>,
}

/// Web API client for the saved-tracks endpoints.
pub struct SpotifyApi {
    client: Client,
    credentials: SpotifyCredentials,
    store: Arc<dyn TokenStore>,
    tokens: Mutex<Option<SpotifyTokens>>,
}

impl SpotifyApi {
    pub fn new(
        client: Client,
        credentials: SpotifyCredentials,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            client,
            credentials,
            tokens: Mutex::new(store.load()),
            store,
        }
    }

    pub fn credentials(&self) -> &SpotifyCredentials {
        &self.credentials
    }

    pub fn is_authorized(&self) -> bool {
        self.current_tokens().is_some()
    }

    /// True when the user still has to go through the browser flow.
    pub fn needs_authorization(&self) -> bool {
        self.credentials.is_configured() && !self.is_authorized()
    }

    fn current_tokens(&self) -> Option<SpotifyTokens> {
        let mut slot = self.tokens.lock().ok()?;
        if slot.is_none() {
            // Another process may have completed the flow meanwhile
            *slot = self.store.load();
        }
        slot.clone()
    }

    fn remember(&self, tokens: SpotifyTokens) {
        self.store.save(&tokens);
        if let Ok(mut slot) = self.tokens.lock() {
            *slot = Some(tokens);
        }
    }

    /// Exchanges the code from the OAuth callback and stores the tokens.
    pub async fn save_token(&self, code: &str) -> Result<(), SpotifyError> {
        if !self.credentials.is_configured() {
            return Err(SpotifyError::MissingCredentials);
        }
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;

        self.remember(SpotifyTokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token.unwrap_or_default(),
            expires_at: now_secs() + token.expires_in,
        });
        tracing::info!("spotify authorised");
        Ok(())
    }

    async fn refresh(&self, tokens: &SpotifyTokens) -> Result<SpotifyTokens, SpotifyError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", tokens.refresh_token.as_str()),
            ])
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;

        let refreshed = SpotifyTokens {
            access_token: token.access_token,
            // Spotify only sometimes rotates the refresh token
            refresh_token: token
                .refresh_token
                .unwrap_or_else(|| tokens.refresh_token.clone()),
            expires_at: now_secs() + token.expires_in,
        };
        self.remember(refreshed.clone());
        tracing::debug!("spotify token refreshed");
        Ok(refreshed)
    }

    async fn access_token(&self) -> Result<String, SpotifyError> {
        let tokens = self.current_tokens().ok_or(SpotifyError::Unauthorized)?;
        if tokens.is_expired() {
            return Ok(self.refresh(&tokens).await?.access_token);
        }
        Ok(tokens.access_token)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<Response, SpotifyError> {
        let token = self.access_token().await?;
        check(request.bearer_auth(token).send().await?).await
    }

    /// Whether the track is in the user's library.
    pub async fn is_saved(&self, track_id: &str) -> Result<bool, SpotifyError> {
        let response = self.authorized(
            self.client
                .get(format!("{API_BASE}/me/tracks/contains"))
                .query(&[("ids", track_id)]),
        )
        .await?;
        let saved: Vec<bool> = response.json().await?;
        Ok(saved.first().copied().unwrap_or(false))
    }

    pub async fn save(&self, track_id: &str) -> Result<(), SpotifyError> {
        self.authorized(
            self.client
                .put(format!("{API_BASE}/me/tracks"))
                .query(&[("ids", track_id)]),
        )
        .await?;
        Ok(())
    }

    pub async fn remove(&self, track_id: &str) -> Result<(), SpotifyError> {
        self.authorized(
            self.client
                .delete(format!("{API_BASE}/me/tracks"))
                .query(&[("ids", track_id)]),
        )
        .await?;
        Ok(())
    }

    /// Saved status of the track behind a `spotify:track:` URI.
    pub async fn is_uri_saved(&self, track_uri: &str) -> Result<bool, SpotifyError> {
        self.is_saved(&track_id_from_uri(track_uri)?).await
    }

    pub async fn set_uri_saved(&self, track_uri: &str, saved: bool) -> Result<(), SpotifyError> {
        let id = track_id_from_uri(track_uri)?;
        if saved {
            self.save(&id).await
        } else {
            self.remove(&id).await
        }
    }
}

async fn check(response: Response) -> Result<Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 401 {
        return Err(SpotifyError::Unauthorized);
    }
    Err(SpotifyError::Status {
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    })
}

/// `spotify:track:4uLU6hMCjMI75M1A2tKUQC` → `4uLU6hMCjMI75M1A2tKUQC`
pub fn track_id_from_uri(uri: &str) -> Result<String, SpotifyError> {
    uri.trim()
        .strip_prefix("spotify:track:")
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_string)
        .ok_or_else(|| SpotifyError::TrackId(uri.to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::auth::MemoryTokenStore;
    use super::*;

    #[test]
    fn test_track_id_from_uri() {
        assert_eq!(
            track_id_from_uri("spotify:track:4uLU6hMCjMI75M1A2tKUQC\n").unwrap(),
            "4uLU6hMCjMI75M1A2tKUQC"
        );
        assert!(track_id_from_uri("spotify:local:Artist:Album:Song:200").is_err());
        assert!(track_id_from_uri("spotify:track:").is_err());
    }

    #[tokio::test]
    async fn test_needs_authorization() {
        let store = Arc::new(MemoryTokenStore::default());
        let unconfigured =
            SpotifyApi::new(Client::new(), SpotifyCredentials::default(), store.clone());
        assert!(!unconfigured.needs_authorization());

        let creds = SpotifyCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            ..Default::default()
        };
        let api = SpotifyApi::new(Client::new(), creds, store.clone());
        assert!(api.needs_authorization());
        assert!(matches!(
            api.is_saved("abc").await,
            Err(SpotifyError::Unauthorized)
        ));

        // Tokens written by another process are picked up lazily
        store.save(&SpotifyTokens {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: now_secs() + 3600,
        });
        assert!(!api.needs_authorization());
    }
}
