use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use super::SpotifyError;

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SCOPES: &str = "user-library-read user-library-modify";
pub const DEFAULT_REDIRECT_URI: &str = "muse://callback";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyCredentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

impl SpotifyCredentials {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Page the user has to visit to grant access.
    pub fn authorization_url(&self) -> Result<String, SpotifyError> {
        if !self.is_configured() {
            return Err(SpotifyError::MissingCredentials);
        }
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
            ],
        )
        .map_err(|e| SpotifyError::Url(e.to_string()))?;
        Ok(url.to_string())
    }
}

impl Default for SpotifyCredentials {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: u64,
}

impl SpotifyTokens {
    /// Treats tokens as expired a minute early.
    pub fn is_expired(&self) -> bool {
        now_secs() + 60 >= self.expires_at
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Where tokens survive between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<SpotifyTokens>;
    fn save(&self, tokens: &SpotifyTokens);
}

/// Keeps tokens for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<SpotifyTokens>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<SpotifyTokens> {
        self.tokens.lock().ok().and_then(|t| t.clone())
    }

    fn save(&self, tokens: &SpotifyTokens) {
        if let Ok(mut slot) = self.tokens.lock() {
            *slot = Some(tokens.clone());
        }
    }
}

/// Extracts the `code` query item from an OAuth callback such as
/// `muse://callback?code=AQD…`.
pub fn authorization_code(url: &str) -> Result<String, SpotifyError> {
    let parsed = Url::parse(url).map_err(|e| SpotifyError::Url(e.to_string()))?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| SpotifyError::MissingCode(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_code() {
        assert_eq!(
            authorization_code("muse://callback?code=AQDx_1&state=abc").unwrap(),
            "AQDx_1"
        );
        assert!(matches!(
            authorization_code("muse://callback?error=access_denied"),
            Err(SpotifyError::MissingCode(_))
        ));
        assert!(matches!(
            authorization_code("not a url"),
            Err(SpotifyError::Url(_))
        ));
    }

    #[test]
    fn test_authorization_url_requires_credentials() {
        assert!(matches!(
            SpotifyCredentials::default().authorization_url(),
            Err(SpotifyError::MissingCredentials)
        ));

        let creds = SpotifyCredentials {
            client_id: "abc".into(),
            client_secret: "xyz".into(),
            ..Default::default()
        };
        let url = creds.authorization_url().unwrap();
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=abc"));
        assert!(url.contains("redirect_uri=muse%3A%2F%2Fcallback"));
        assert!(!url.contains("xyz"));
    }

    #[test]
    fn test_token_expiry() {
        let fresh = SpotifyTokens {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: now_secs() + 3600,
        };
        assert!(!fresh.is_expired());

        let stale = SpotifyTokens {
            expires_at: now_secs() + 30,
            ..fresh
        };
        assert!(stale.is_expired());
    }
}
