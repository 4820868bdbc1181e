//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Web API and the accounts service return.
//! DO NOT use these types outside the catalog module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api
//!
//! Example search response:
//! ```json
//! {
//!   "tracks": {
//!     "href": "...",
//!     "limit": 50, "offset": 0, "total": 1, "next": null,
//!     "items": [{
//!       "id": "4uLU6hMCjMI75M1A2tKUQC",
//!       "name": "Song Title",
//!       "uri": "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
//!       "artists": [{"id": "0OdUWJ0sBjDrqHygGUXeCF", "name": "Artist Name"}]
//!     }]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Token endpoint response (authorization code and refresh grants)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
    pub scope: Option<String>,
    /// Only present on the code grant, or when the refresh token rotates
    pub refresh_token: Option<String>,
}

/// Token endpoint error body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthErrorBody {
    pub error: String,
    pub error_description: Option<String>,
}

/// Web API error body: `{"error": {"status": 401, "message": "..."}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorDetail {
    pub status: u16,
    pub message: String,
}

/// `GET /me`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

/// Generic paging object.
///
/// Items may be `null` (unavailable or removed content), hence `Option`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    pub next: Option<String>,
}

/// `GET /search?type=track`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<Track>>,
}

/// Full track object (only the fields we use)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    /// Null for local files
    pub id: Option<String>,
    pub name: String,
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

/// Simplified playlist object from playlist listings and creation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
    pub owner: Option<PlaylistOwner>,
    /// Older responses call this `tracks`, newer ones `items`
    #[serde(alias = "items")]
    pub tracks: Option<TracksRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistOwner {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TracksRef {
    pub total: u32,
}

/// Response of playlist mutations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

/// `POST /users/{user_id}/playlists` body
#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub public: bool,
    pub description: &'a str,
}

/// `PUT|POST /playlists/{id}/tracks` body
#[derive(Debug, Clone, Serialize)]
pub struct TrackUrisRequest {
    pub uris: Vec<String>,
}
