//! OAuth authorization-code flow against the Spotify accounts service.
//!
//! Playlist mutation needs a user token, so the flow is:
//! 1. `authorize` prints [`authorize_url`]; the user approves in a browser
//! 2. the redirect URL (or bare code) is fed back and exchanged for tokens
//! 3. the refresh token is cached; every `build` run refreshes it into a
//!    short-lived access token
//!
//! See: https://developer.spotify.com/documentation/web-api/tutorials/code-flow

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::client::{build_http_client, classify_failure, parse_retry_after, transport_error};
use super::domain::CatalogError;
use super::dto;
use crate::error::{Error, Result, ResultExt};

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Scopes needed to create and edit public and private playlists
pub const DEFAULT_SCOPES: &str = "playlist-modify-public playlist-modify-private";

/// Application credentials registered with the catalog
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthCredentials {
    /// Assemble credentials, naming the first missing piece.
    pub fn from_parts(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
    ) -> std::result::Result<Self, CatalogError> {
        fn require(value: Option<String>, name: &str) -> std::result::Result<String, CatalogError> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| CatalogError::Auth(format!("{name} is not set")))
        }

        Ok(Self {
            client_id: require(client_id, "SPOTIFY_CLIENT_ID")?,
            client_secret: require(client_secret, "SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: require(redirect_uri, "SPOTIFY_REDIRECT_URI")?,
        })
    }
}

/// URL the user opens to grant access
pub fn authorize_url(credentials: &OAuthCredentials, scopes: &str) -> String {
    format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&scope={}",
        AUTHORIZE_URL,
        urlencoding::encode(&credentials.client_id),
        urlencoding::encode(&credentials.redirect_uri),
        urlencoding::encode(scopes)
    )
}

/// Pull the authorization code out of a pasted redirect URL or bare code.
pub fn extract_code(input: &str) -> std::result::Result<String, CatalogError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CatalogError::Auth("no authorization code given".to_string()));
    }

    if !(input.starts_with("http://") || input.starts_with("https://")) {
        return Ok(input.to_string());
    }

    let url = reqwest::Url::parse(input)
        .map_err(|e| CatalogError::Auth(format!("invalid redirect URL: {e}")))?;
    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => return Err(CatalogError::Auth(format!("authorization denied: {value}"))),
            "code" => code = Some(value.into_owned()),
            _ => {}
        }
    }
    code.ok_or_else(|| CatalogError::Auth("redirect URL has no 'code' parameter".to_string()))
}

/// Tokens issued by the accounts service
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    /// Present on the code grant, and on refresh when the token rotates
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<dto::TokenResponse> for TokenGrant {
    fn from(response: dto::TokenResponse) -> Self {
        let lifetime = TimeDelta::seconds(response.expires_in.min(86_400) as i64);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            scope: response.scope,
            expires_at: Utc::now() + lifetime,
        }
    }
}

/// Client for the token endpoint
pub struct AuthClient {
    http_client: reqwest::Client,
    token_url: String,
}

impl AuthClient {
    pub fn new(request_timeout: Duration) -> std::result::Result<Self, CatalogError> {
        Ok(Self {
            http_client: build_http_client(request_timeout)?,
            token_url: TOKEN_URL.to_string(),
        })
    }

    /// Create a client for testing with custom token endpoint
    #[cfg(test)]
    pub fn with_token_url(token_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            token_url: token_url.into(),
        }
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(
        &self,
        credentials: &OAuthCredentials,
        code: &str,
    ) -> std::result::Result<TokenGrant, CatalogError> {
        self.request_token(
            credentials,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", credentials.redirect_uri.as_str()),
            ],
        )
        .await
    }

    /// Trade a refresh token for a fresh access token
    pub async fn refresh(
        &self,
        credentials: &OAuthCredentials,
        refresh_token: &str,
    ) -> std::result::Result<TokenGrant, CatalogError> {
        self.request_token(
            credentials,
            &[("grant_type", "refresh_token"), ("refresh_token", refresh_token)],
        )
        .await
    }

    async fn request_token(
        &self,
        credentials: &OAuthCredentials,
        form: &[(&str, &str)],
    ) -> std::result::Result<TokenGrant, CatalogError> {
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_token_failure(status, retry_after, &body));
        }

        let token: dto::TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(token.into())
    }
}

/// The token endpoint reports grant problems as 400 with an OAuth error body.
fn classify_token_failure(status: StatusCode, retry_after: Option<Duration>, body: &str) -> CatalogError {
    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
        let message = match serde_json::from_str::<dto::AuthErrorBody>(body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => format!("HTTP {status}"),
        };
        return CatalogError::Auth(message);
    }
    classify_failure(status, retry_after, body)
}

// ============================================================================
// Token Cache
// ============================================================================

/// Refresh token persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCache {
    pub refresh_token: String,
    pub scope: Option<String>,
    /// RFC 3339 timestamp of the last update
    pub updated_at: String,
}

impl TokenCache {
    pub fn new(refresh_token: impl Into<String>, scope: Option<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            scope,
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Default token cache location, next to the config file
pub fn token_cache_path() -> Option<PathBuf> {
    crate::config::config_dir().map(|d| d.join("token.json"))
}

/// Load the token cache. A missing file is `Ok(None)`.
pub fn load_token_cache(path: &Path) -> Result<Option<TokenCache>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(format!("reading token cache {}", path.display()))?;
    let cache = serde_json::from_str(&contents)
        .map_err(|e| Error::config(format!("corrupt token cache {}: {e}", path.display())))?;
    Ok(Some(cache))
}

/// Save the token cache atomically (write to temp, then rename).
pub fn save_token_cache(path: &Path, cache: &TokenCache) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(format!("creating {}", dir.display()))?;
    }
    let contents = serde_json::to_string_pretty(cache)
        .map_err(|e| Error::config(format!("serializing token cache: {e}")))?;

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, contents).with_context(format!("writing {}", temp_path.display()))?;
    restrict_permissions(&temp_path)?;
    std::fs::rename(&temp_path, path).with_context(format!("replacing {}", path.display()))?;

    tracing::info!(path = %path.display(), "Saved refresh token");
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(format!("restricting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
