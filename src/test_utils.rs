//! Test utilities and fixtures for openbroadcast-playlist tests.
//!
//! This module provides markup builders shaped like the discovery page, so
//! harvester tests do not repeat HTML boilerplate.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{default_selectors, media_row, page};
//!
//! #[test]
//! fn test_something() {
//!     let markup = page(&[media_row("Foo", "Bar")]);
//!     let extraction = extract_records(&markup, &default_selectors(), 0);
//!     // ... test logic
//! }
//! ```

use crate::config::SourceConfig;
use crate::harvest::TrackSelectors;

/// Selectors from the default configuration.
pub fn default_selectors() -> TrackSelectors {
    let source = SourceConfig::default();
    TrackSelectors::parse(&source.row_selector, &source.title_selector, &source.artist_selector)
        .expect("Default selectors must compile")
}

/// One track row as rendered by the discovery page.
///
/// Text is inserted verbatim, so callers may pass entities or whitespace.
pub fn media_row(title: &str, artist: &str) -> String {
    format!(
        r##"<div class="media-row"><div class="name"><a href="#">{title}</a></div><div class="artists"><a class="artist__name" href="#">{artist}</a></div></div>"##
    )
}

/// A track row whose artist element is missing entirely.
pub fn media_row_without_artist(title: &str) -> String {
    format!(r##"<div class="media-row"><div class="name"><a href="#">{title}</a></div></div>"##)
}

/// Wrap rows in a complete HTML document.
pub fn page(rows: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Discover</title></head><body><div class=\"listing\">{}</div></body></html>",
        rows.concat()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_row_contains_both_fields() {
        let row = media_row("Foo", "Bar");
        assert!(row.contains(">Foo</a>"));
        assert!(row.contains("artist__name"));
    }

    #[test]
    fn test_page_keeps_row_order() {
        let markup = page(&[media_row("One", "A"), media_row("Two", "B")]);
        let one = markup.find("One").unwrap();
        let two = markup.find("Two").unwrap();
        assert!(one < two);
    }
}
