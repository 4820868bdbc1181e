//! Extraction of track records from the rendered discovery page.
//!
//! The markup is parsed once, after growth has finished. Every element
//! matching the row selector is one candidate record; rows without a
//! usable title or artist are skipped and reported, never fatal.

use scraper::{ElementRef, Html, Selector};

use super::HarvestError;
use crate::model::{TrackRecord, normalize_text};

/// Compiled CSS selectors describing a track row
#[derive(Debug, Clone)]
pub struct TrackSelectors {
    row: Selector,
    title: Selector,
    artist: Selector,
}

impl TrackSelectors {
    /// Compile the row, title and artist selectors.
    ///
    /// Title and artist selectors are evaluated relative to each row.
    pub fn parse(row: &str, title: &str, artist: &str) -> Result<Self, HarvestError> {
        Ok(Self {
            row: compile(row)?,
            title: compile(title)?,
            artist: compile(artist)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Why a row did not yield a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
    MissingArtist,
    EmptyTitle,
    EmptyArtist,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::MissingTitle => "title element not found",
            Self::MissingArtist => "artist element not found",
            Self::EmptyTitle => "title is empty",
            Self::EmptyArtist => "artist is empty",
        };
        f.write_str(text)
    }
}

/// Result of one extraction pass
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Rows matching the row selector
    pub rows_found: usize,
    /// Valid records, in page order
    pub records: Vec<TrackRecord>,
    /// Skipped rows as (row index, reason)
    pub skipped: Vec<(usize, SkipReason)>,
    /// Extraction stopped early because of the record cap
    pub capped: bool,
}

/// Extract track records from rendered markup.
///
/// `max_records` caps the number of valid records produced (0 = unlimited).
pub fn extract_records(markup: &str, selectors: &TrackSelectors, max_records: usize) -> Extraction {
    let document = Html::parse_document(markup);
    let rows: Vec<ElementRef<'_>> = document.select(&selectors.row).collect();

    let mut extraction = Extraction {
        rows_found: rows.len(),
        ..Default::default()
    };
    tracing::info!("Found {} track rows", rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        if max_records > 0 && extraction.records.len() >= max_records {
            extraction.capped = true;
            tracing::info!(max_records, "Record cap reached, ignoring remaining rows");
            break;
        }

        match parse_row(&row, selectors) {
            Ok(record) => extraction.records.push(record),
            Err(reason) => {
                tracing::warn!(row = index, %reason, "Title or artist not found for a track");
                extraction.skipped.push((index, reason));
            }
        }
    }

    extraction
}

fn parse_row(row: &ElementRef<'_>, selectors: &TrackSelectors) -> Result<TrackRecord, SkipReason> {
    let title = first_text(row, &selectors.title).ok_or(SkipReason::MissingTitle)?;
    let artist = first_text(row, &selectors.artist).ok_or(SkipReason::MissingArtist)?;

    if title.is_empty() {
        return Err(SkipReason::EmptyTitle);
    }
    if artist.is_empty() {
        return Err(SkipReason::EmptyArtist);
    }

    // Both fields are non-empty after normalization here
    TrackRecord::new(&title, &artist).ok_or(SkipReason::EmptyTitle)
}

fn first_text(row: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|element| normalize_text(&element.text().collect::<String>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{default_selectors, media_row, media_row_without_artist, page};

    #[test]
    fn test_extracts_rows_in_page_order() {
        let markup = page(&[media_row("First", "Alpha"), media_row("Second", "Beta")]);
        let extraction = extract_records(&markup, &default_selectors(), 0);

        assert_eq!(extraction.rows_found, 2);
        assert_eq!(
            extraction.records,
            vec![
                TrackRecord::new("First", "Alpha").unwrap(),
                TrackRecord::new("Second", "Beta").unwrap(),
            ]
        );
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_missing_artist_skips_only_that_row() {
        let markup = page(&[
            media_row("One", "A"),
            media_row_without_artist("Two"),
            media_row("Three", "C"),
        ]);
        let extraction = extract_records(&markup, &default_selectors(), 0);

        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.skipped, vec![(1, SkipReason::MissingArtist)]);
    }

    #[test]
    fn test_missing_name_block_is_missing_title() {
        let markup = page(&[r#"<div class="media-row"><a class="artist__name">Solo</a></div>"#
            .to_string()]);
        let extraction = extract_records(&markup, &default_selectors(), 0);

        assert!(extraction.records.is_empty());
        assert_eq!(extraction.skipped, vec![(0, SkipReason::MissingTitle)]);
    }

    #[test]
    fn test_whitespace_only_title_is_skipped() {
        let markup = page(&[media_row("   \n ", "Someone")]);
        let extraction = extract_records(&markup, &default_selectors(), 0);
        assert_eq!(extraction.skipped, vec![(0, SkipReason::EmptyTitle)]);
    }

    #[test]
    fn test_text_is_trimmed_and_entities_decoded() {
        let markup = page(&[media_row("  Rock &amp; Roll\n ", " Bands\tUnited ")]);
        let extraction = extract_records(&markup, &default_selectors(), 0);

        assert_eq!(extraction.records[0].title, "Rock & Roll");
        assert_eq!(extraction.records[0].artist, "Bands United");
    }

    #[test]
    fn test_record_cap_stops_early() {
        let rows: Vec<String> = (0..10)
            .map(|i| media_row(&format!("Song {i}"), "Artist"))
            .collect();
        let extraction = extract_records(&page(&rows), &default_selectors(), 4);

        assert_eq!(extraction.records.len(), 4);
        assert!(extraction.capped);
        assert_eq!(extraction.records[3].title, "Song 3");
    }

    #[test]
    fn test_page_without_rows_is_empty_not_error() {
        let extraction = extract_records("<html><body><p>nothing</p></body></html>", &default_selectors(), 0);
        assert_eq!(extraction.rows_found, 0);
        assert!(extraction.records.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let result = TrackSelectors::parse("div..broken", "div.name a", "a.artist__name");
        assert!(matches!(result, Err(HarvestError::Selector { .. })));
    }
}
