//! Trait definition for the catalog client.
//!
//! Enables dependency injection and mocking for tests. Production code uses
//! [`SpotifyClient`](super::SpotifyClient), tests substitute
//! [`mocks::MockCatalog`].

use async_trait::async_trait;

use super::domain::{CatalogError, CatalogUser, PlaylistSummary, SearchPage};
use crate::model::CatalogTrackId;

/// Operations the playlist builder needs from the catalog
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// The authenticated user.
    async fn current_user(&self) -> Result<CatalogUser, CatalogError>;

    /// One page of track search results.
    async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchPage, CatalogError>;

    /// Every playlist of the user, in the order the service lists them.
    async fn list_user_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, CatalogError>;

    /// Create an empty playlist.
    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistSummary, CatalogError>;

    /// Replace the whole membership with `ids` (at most one batch).
    async fn replace_tracks(&self, playlist_id: &str, ids: &[CatalogTrackId]) -> Result<(), CatalogError>;

    /// Append `ids` (at most one batch).
    async fn add_tracks(&self, playlist_id: &str, ids: &[CatalogTrackId]) -> Result<(), CatalogError>;
}

#[async_trait]
impl CatalogApi for super::SpotifyClient {
    async fn current_user(&self) -> Result<CatalogUser, CatalogError> {
        self.current_user().await
    }

    async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchPage, CatalogError> {
        self.search(query, limit, offset).await
    }

    async fn list_user_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, CatalogError> {
        self.list_user_playlists(user_id).await
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistSummary, CatalogError> {
        self.create_playlist(user_id, name, public).await
    }

    async fn replace_tracks(&self, playlist_id: &str, ids: &[CatalogTrackId]) -> Result<(), CatalogError> {
        self.replace_tracks(playlist_id, ids).await
    }

    async fn add_tracks(&self, playlist_id: &str, ids: &[CatalogTrackId]) -> Result<(), CatalogError> {
        self.add_tracks(playlist_id, ids).await
    }
}
