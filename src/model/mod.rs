//! Core data models shared by the harvester and the playlist builder.
//!
//! Defines the primary values that flow through both pipelines:
//! [`TrackRecord`], [`SearchQuery`], [`CatalogTrackId`] and [`PlaylistMode`].
//!
//! # Query format
//!
//! A search query is rendered as `track:<title> artist:<artist>`, the field
//! filter syntax understood by the catalog's free-text search. Titles and
//! artists are stored with internal whitespace collapsed so that a query
//! always fits on one line of the query file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix of the title field in a rendered query.
const TITLE_FIELD: &str = "track:";
/// Separator introducing the artist field in a rendered query.
const ARTIST_FIELD: &str = " artist:";

/// A track as advertised on the discovery page.
///
/// Only ever built from a successful extraction; both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    /// Track title (trimmed, whitespace collapsed)
    pub title: String,
    /// Artist name (trimmed, whitespace collapsed)
    pub artist: String,
}

impl TrackRecord {
    /// Build a record from raw element text.
    ///
    /// Returns `None` when either field is empty after normalization.
    pub fn new(title: &str, artist: &str) -> Option<Self> {
        let title = normalize_text(title);
        let artist = normalize_text(artist);
        if title.is_empty() || artist.is_empty() {
            return None;
        }
        Some(Self { title, artist })
    }

    /// Project this record into the query submitted to the catalog.
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery(format!(
            "{TITLE_FIELD}{}{ARTIST_FIELD}{}",
            self.title, self.artist
        ))
    }
}

/// Formatted free-text query for the catalog search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Build the query for a title/artist pair.
    ///
    /// Returns `None` if either part is blank.
    pub fn new(title: &str, artist: &str) -> Option<Self> {
        TrackRecord::new(title, artist).map(|record| record.to_query())
    }

    /// Accept one line of a query file as a query.
    ///
    /// Any non-blank line is a valid query; lines that do not follow the
    /// `track:... artist:...` layout are still searched verbatim.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = normalize_text(line);
        if line.is_empty() {
            None
        } else {
            Some(Self(line))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the query back into its title and artist parts.
    ///
    /// The artist field starts at the LAST ` artist:` occurrence, so a title
    /// that itself contains `artist:` still splits correctly.
    pub fn parts(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix(TITLE_FIELD)?;
        let (title, artist) = rest.rsplit_once(ARTIST_FIELD)?;
        if title.is_empty() || artist.is_empty() {
            return None;
        }
        Some((title, artist))
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque track identifier assigned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogTrackId(String);

impl CatalogTrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URI form used by the playlist mutation endpoints.
    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.0)
    }
}

impl fmt::Display for CatalogTrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a run treats the existing membership of the target playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistMode {
    /// Clear the playlist, then add the resolved tracks
    #[default]
    Replace,
    /// Add the resolved tracks after the existing ones
    Append,
}

impl FromStr for PlaylistMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            other => Err(format!(
                "unknown playlist mode '{other}' (expected 'replace' or 'append')"
            )),
        }
    }
}

impl fmt::Display for PlaylistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("replace"),
            Self::Append => f.write_str("append"),
        }
    }
}

/// Trim and collapse runs of whitespace (including newlines) to one space.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_format_is_exact() {
        let query = SearchQuery::new("Foo", "Bar").unwrap();
        assert_eq!(query.as_str(), "track:Foo artist:Bar");
    }

    #[test]
    fn test_record_trims_and_collapses_whitespace() {
        let record = TrackRecord::new("  Night\n   Drive ", "\tThe  Band\n").unwrap();
        assert_eq!(record.title, "Night Drive");
        assert_eq!(record.artist, "The Band");
    }

    #[test]
    fn test_record_rejects_blank_fields() {
        assert!(TrackRecord::new("", "Artist").is_none());
        assert!(TrackRecord::new("Title", "   ").is_none());
        assert!(SearchQuery::new("\n", "Artist").is_none());
    }

    #[test]
    fn test_parts_split_on_last_artist_field() {
        let query = SearchQuery::new("Song artist: Remix", "Someone").unwrap();
        assert_eq!(query.as_str(), "track:Song artist: Remix artist:Someone");
        assert_eq!(query.parts(), Some(("Song artist: Remix", "Someone")));
    }

    #[test]
    fn test_free_text_line_has_no_parts() {
        let query = SearchQuery::from_line("just some words").unwrap();
        assert_eq!(query.parts(), None);
        assert!(SearchQuery::from_line("   ").is_none());
    }

    #[test]
    fn test_track_uri() {
        let id = CatalogTrackId::new("4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(id.uri(), "spotify:track:4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn test_playlist_mode_parsing() {
        assert_eq!("replace".parse::<PlaylistMode>(), Ok(PlaylistMode::Replace));
        assert_eq!("APPEND".parse::<PlaylistMode>(), Ok(PlaylistMode::Append));
        assert!("merge".parse::<PlaylistMode>().is_err());
        assert_eq!(PlaylistMode::default(), PlaylistMode::Replace);
    }
}
