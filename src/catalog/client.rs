//! Spotify Web API HTTP client
//!
//! Handles search and playlist management for the authenticated user.
//! See: https://developer.spotify.com/documentation/web-api
//!
//! ## API Quirks
//!
//! ### Rate limiting
//! A 429 response carries a `Retry-After` header (seconds). We surface it
//! on [`CatalogError::RateLimited`] so the retry policy can wait at least
//! that long.
//!
//! ### Playlist mutations
//! `PUT /playlists/{id}/tracks` replaces the whole membership, `POST` appends.
//! Both accept at most [`MAX_BATCH_SIZE`] URIs per call.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::domain::{CatalogError, CatalogUser, PlaylistSummary, SearchPage};
use super::{adapter, dto};
use crate::model::CatalogTrackId;

/// Maximum number of track URIs per playlist mutation
pub const MAX_BATCH_SIZE: usize = 100;

/// Page size used when listing the user's playlists
const PLAYLIST_PAGE_SIZE: u32 = 50;

const PLAYLIST_DESCRIPTION: &str = "Tracks discovered on openbroadcast.ch";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Web API client bound to one access token
pub struct SpotifyClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SpotifyClient {
    /// Create a client for the given access token.
    ///
    /// `request_timeout` bounds every request, including reading the body.
    pub fn new(access_token: impl Into<String>, request_timeout: Duration) -> Result<Self, CatalogError> {
        Ok(Self {
            http_client: build_http_client(request_timeout)?,
            base_url: "https://api.spotify.com/v1".to_string(),
            access_token: access_token.into(),
        })
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    /// The user owning the access token
    pub async fn current_user(&self) -> Result<CatalogUser, CatalogError> {
        let request = self.http_client.get(format!("{}/me", self.base_url));
        let profile: dto::UserProfile = self.send(request).await?;
        Ok(adapter::to_user(profile))
    }

    /// Search tracks matching a free-text query
    pub async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchPage, CatalogError> {
        let limit = limit.to_string();
        let offset = offset.to_string();
        let request = self
            .http_client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ]);
        let response: dto::SearchResponse = self.send(request).await?;
        Ok(adapter::to_search_page(response))
    }

    /// All playlists of a user, following pagination to the end
    pub async fn list_user_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, CatalogError> {
        let mut playlists = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/users/{}/playlists?limit={}&offset={}",
                self.base_url,
                urlencoding::encode(user_id),
                PLAYLIST_PAGE_SIZE,
                offset
            );
            let page: dto::Paging<dto::SimplifiedPlaylist> = self.send(self.http_client.get(url)).await?;
            let has_next = page.next.is_some();
            let fetched = page.items.len() as u32;
            playlists.extend(adapter::to_playlists(page));

            if !has_next || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        tracing::debug!(user = user_id, count = playlists.len(), "Listed playlists");
        Ok(playlists)
    }

    /// Create a new playlist for the user
    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistSummary, CatalogError> {
        let request = self
            .http_client
            .post(format!(
                "{}/users/{}/playlists",
                self.base_url,
                urlencoding::encode(user_id)
            ))
            .json(&dto::CreatePlaylistRequest {
                name,
                public,
                description: PLAYLIST_DESCRIPTION,
            });
        let playlist: dto::SimplifiedPlaylist = self.send(request).await?;
        Ok(adapter::to_playlist(playlist))
    }

    /// Replace the whole playlist membership with `ids`
    pub async fn replace_tracks(&self, playlist_id: &str, ids: &[CatalogTrackId]) -> Result<(), CatalogError> {
        let request = self.http_client.put(self.playlist_tracks_url(playlist_id));
        self.mutate_tracks(request, ids).await
    }

    /// Append `ids` to the playlist
    pub async fn add_tracks(&self, playlist_id: &str, ids: &[CatalogTrackId]) -> Result<(), CatalogError> {
        let request = self.http_client.post(self.playlist_tracks_url(playlist_id));
        self.mutate_tracks(request, ids).await
    }

    fn playlist_tracks_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/playlists/{}/tracks",
            self.base_url,
            urlencoding::encode(playlist_id)
        )
    }

    async fn mutate_tracks(&self, request: RequestBuilder, ids: &[CatalogTrackId]) -> Result<(), CatalogError> {
        if ids.len() > MAX_BATCH_SIZE {
            return Err(CatalogError::Api {
                status: 400,
                message: format!("batch of {} exceeds the limit of {}", ids.len(), MAX_BATCH_SIZE),
            });
        }
        let body = dto::TrackUrisRequest {
            uris: ids.iter().map(CatalogTrackId::uri).collect(),
        };
        let snapshot: dto::SnapshotResponse = self.send(request.json(&body)).await?;
        tracing::debug!(snapshot = %snapshot.snapshot_id, count = ids.len(), "Playlist updated");
        Ok(())
    }

    /// Send an authorized request and decode the JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CatalogError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, retry_after, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

pub(crate) fn build_http_client(request_timeout: Duration) -> Result<reqwest::Client, CatalogError> {
    reqwest::Client::builder()
        .gzip(true)
        .user_agent(USER_AGENT)
        .timeout(request_timeout)
        .build()
        .map_err(|e| CatalogError::Network(format!("failed to build HTTP client: {e}")))
}

/// Map a failed send to a timeout or network error
pub(crate) fn transport_error(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Timeout(e.to_string())
    } else {
        CatalogError::Network(e.to_string())
    }
}

/// `Retry-After` in seconds, if present and numeric
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Turn a non-success response into a typed error
pub(crate) fn classify_failure(status: StatusCode, retry_after: Option<Duration>, body: &str) -> CatalogError {
    let message = serde_json::from_str::<dto::ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            let snippet: String = body.chars().take(200).collect();
            if snippet.is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                snippet
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CatalogError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => CatalogError::RateLimited { retry_after },
        StatusCode::NOT_FOUND => CatalogError::NotFound(message),
        s if s.is_server_error() => CatalogError::Server {
            status: s.as_u16(),
            message,
        },
        s => CatalogError::Api {
            status: s.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new("token", Duration::from_secs(30)).unwrap();
        assert_eq!(client.base_url, "https://api.spotify.com/v1");
        assert_eq!(client.access_token, "token");
    }

    #[test]
    fn test_client_with_custom_url() {
        let client = SpotifyClient::with_base_url("token", "http://localhost:8080");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_playlist_tracks_url_is_encoded() {
        let client = SpotifyClient::with_base_url("t", "http://localhost");
        assert_eq!(
            client.playlist_tracks_url("abc/def"),
            "http://localhost/playlists/abc%2Fdef/tracks"
        );
    }

    #[test]
    fn test_classify_auth_failures() {
        let body = r#"{"error": {"status": 401, "message": "The access token expired"}}"#;
        let err = classify_failure(StatusCode::UNAUTHORIZED, None, body);
        assert!(matches!(err, CatalogError::Auth(ref m) if m == "The access token expired"));

        let err = classify_failure(StatusCode::FORBIDDEN, None, "");
        assert!(err.is_auth());
    }

    #[test]
    fn test_classify_rate_limit_keeps_retry_after() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, Some(Duration::from_secs(3)), "");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_classify_server_and_client_errors() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, None, "<html>upstream</html>");
        assert!(matches!(err, CatalogError::Server { status: 502, .. }));
        assert!(err.is_transient());

        let err = classify_failure(StatusCode::BAD_REQUEST, None, "");
        assert!(matches!(err, CatalogError::Api { status: 400, ref message } if message == "Bad Request"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(12)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("openbroadcast-playlist/"));
    }
}
