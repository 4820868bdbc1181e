//! Internal domain models for the music catalog.
//!
//! These types are OUR types - they don't change when the Web API changes.
//! All API responses get converted into these types via the adapter.

use std::time::Duration;

use crate::model::CatalogTrackId;

/// The authenticated catalog user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// One track returned by a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMatch {
    pub id: CatalogTrackId,
    /// Track title as listed in the catalog
    pub name: String,
    /// Artist names in credit order
    pub artists: Vec<String>,
}

/// A page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<TrackMatch>,
    /// Total matches available across all pages
    pub total: u32,
    pub offset: u32,
}

/// A playlist owned by or followed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
    pub track_count: Option<u32>,
}

/// Errors that can occur talking to the catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited - try again later")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("API request failed (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Whether repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Network(_) | Self::Timeout(_) | Self::Server { .. }
        )
    }

    /// Credential problems: never retried, always fatal.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Server-requested wait before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}
