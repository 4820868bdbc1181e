//! Adapter layer: Convert Web API DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.

use super::domain::{CatalogUser, PlaylistSummary, SearchPage, TrackMatch};
use super::dto;
use crate::model::CatalogTrackId;

pub fn to_user(profile: dto::UserProfile) -> CatalogUser {
    CatalogUser {
        id: profile.id,
        display_name: profile.display_name,
    }
}

/// Convert a search response into a page of matches.
///
/// Null items and tracks without an id (local files) are dropped; the
/// relative order of the remaining items is kept.
pub fn to_search_page(response: dto::SearchResponse) -> SearchPage {
    let Some(paging) = response.tracks else {
        return SearchPage::default();
    };

    let items = paging
        .items
        .into_iter()
        .flatten()
        .filter_map(|track| {
            let id = track.id?;
            Some(TrackMatch {
                id: CatalogTrackId::new(id),
                name: track.name,
                artists: track.artists.into_iter().map(|a| a.name).collect(),
            })
        })
        .collect();

    SearchPage {
        items,
        total: paging.total,
        offset: paging.offset,
    }
}

pub fn to_playlist(playlist: dto::SimplifiedPlaylist) -> PlaylistSummary {
    PlaylistSummary {
        id: playlist.id,
        name: playlist.name,
        owner_id: playlist.owner.map(|o| o.id),
        track_count: playlist.tracks.map(|t| t.total),
    }
}

/// Convert one page of a playlist listing, skipping null entries.
pub fn to_playlists(page: dto::Paging<dto::SimplifiedPlaylist>) -> Vec<PlaylistSummary> {
    page.items.into_iter().flatten().map(to_playlist).collect()
}
