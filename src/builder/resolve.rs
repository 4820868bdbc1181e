//! Query resolution: free-text query to the first matching catalog track.

use std::collections::HashSet;

use super::{BuildError, RetryError, RetryPolicy};
use crate::catalog::{CatalogApi, TrackMatch};
use crate::model::{CatalogTrackId, SearchQuery};

/// Outcome of resolving one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// First result of the first page
    Resolved(TrackMatch),
    /// The search returned nothing
    Unresolved,
    /// The search kept failing; the query was skipped
    Failed(String),
}

/// Counts produced while resolving a batch of queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveCounts {
    pub resolved: usize,
    pub unresolved: usize,
    pub failed: usize,
}

/// Search for `query` and keep only the first match.
pub async fn resolve_query<C: CatalogApi + ?Sized>(
    catalog: &C,
    policy: &RetryPolicy,
    query: &SearchQuery,
    search_limit: u32,
) -> Result<Option<TrackMatch>, RetryError> {
    let page = policy
        .run("search", || catalog.search(query.as_str(), search_limit, 0))
        .await?;
    Ok(page.items.into_iter().next())
}

/// Resolve every query in order.
///
/// Per-query failures are absorbed into [`Resolution::Failed`]; only an
/// authentication failure aborts.
pub async fn resolve_all<C: CatalogApi + ?Sized>(
    catalog: &C,
    policy: &RetryPolicy,
    queries: &[SearchQuery],
    search_limit: u32,
    counts: &mut ResolveCounts,
) -> Result<Vec<(SearchQuery, Resolution)>, BuildError> {
    let mut resolutions = Vec::with_capacity(queries.len());

    for (index, query) in queries.iter().enumerate() {
        let resolution = match resolve_query(catalog, policy, query, search_limit).await {
            Ok(Some(found)) => {
                counts.resolved += 1;
                tracing::debug!(query = %query, id = %found.id, name = %found.name, "Resolved");
                Resolution::Resolved(found)
            }
            Ok(None) => {
                counts.unresolved += 1;
                tracing::info!(query = %query, "No match found");
                Resolution::Unresolved
            }
            Err(e) if e.source.is_auth() => return Err(e.into()),
            Err(e) => {
                counts.failed += 1;
                tracing::warn!(query = %query, error = %e, "Search failed, skipping query");
                Resolution::Failed(e.to_string())
            }
        };
        resolutions.push((query.clone(), resolution));

        if (index + 1) % 25 == 0 {
            tracing::info!("Resolved {}/{} queries", index + 1, queries.len());
        }
    }

    Ok(resolutions)
}

/// Keep the first occurrence of each id, then apply the track cap
/// (0 = unlimited). Returns the ids and the number of duplicates dropped.
pub fn dedupe_and_cap(
    ids: impl IntoIterator<Item = CatalogTrackId>,
    max_tracks: usize,
) -> (Vec<CatalogTrackId>, usize) {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    let mut duplicates = 0;

    for id in ids {
        if seen.insert(id.clone()) {
            unique.push(id);
        } else {
            duplicates += 1;
        }
    }

    if max_tracks > 0 && unique.len() > max_tracks {
        tracing::info!(
            max_tracks,
            dropped = unique.len() - max_tracks,
            "Track cap reached, dropping the remaining tracks"
        );
        unique.truncate(max_tracks);
    }

    (unique, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::catalog::traits::mocks::MockCatalog;
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn query(title: &str, artist: &str) -> SearchQuery {
        SearchQuery::new(title, artist).unwrap()
    }

    fn ids(raw: &[&str]) -> Vec<CatalogTrackId> {
        raw.iter().map(|s| CatalogTrackId::new(*s)).collect()
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let catalog = MockCatalog::new().with_match("track:Foo artist:Bar", &["X1", "X2", "X3"]);
        let found = resolve_query(&catalog, &policy(), &query("Foo", "Bar"), 50)
            .await
            .unwrap();
        assert_eq!(found.unwrap().id.as_str(), "X1");
    }

    #[tokio::test]
    async fn test_empty_page_is_unresolved_not_error() {
        let catalog = MockCatalog::new();
        let found = resolve_query(&catalog, &policy(), &query("Nobody", "Knows"), 50)
            .await
            .unwrap();
        assert!(found.is_none());
        assert_eq!(catalog.searches(), vec!["track:Nobody artist:Knows"]);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let catalog = MockCatalog::new()
            .with_match("track:Foo artist:Bar", &["X1"])
            .failing("search", CatalogError::RateLimited { retry_after: None }, 2);
        let found = resolve_query(&catalog, &policy(), &query("Foo", "Bar"), 50)
            .await
            .unwrap();
        assert_eq!(found.unwrap().id.as_str(), "X1");
        assert_eq!(catalog.searches().len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_search_is_skipped() {
        let catalog = MockCatalog::new()
            .with_match("track:B artist:B", &["B1"])
            .failing("search", CatalogError::Network("down".into()), 3);
        let queries = [query("A", "A"), query("B", "B")];
        let mut counts = ResolveCounts::default();

        let resolutions = resolve_all(&catalog, &policy(), &queries, 50, &mut counts)
            .await
            .unwrap();

        assert!(matches!(resolutions[0].1, Resolution::Failed(_)));
        assert!(matches!(resolutions[1].1, Resolution::Resolved(ref m) if m.id.as_str() == "B1"));
        assert_eq!(
            counts,
            ResolveCounts {
                resolved: 1,
                unresolved: 0,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_resolution() {
        let catalog = MockCatalog::new().failing("search", CatalogError::Auth("expired".into()), 1);
        let queries = [query("A", "A"), query("B", "B")];
        let mut counts = ResolveCounts::default();

        let result = resolve_all(&catalog, &policy(), &queries, 50, &mut counts).await;

        assert!(matches!(result, Err(BuildError::Auth(_))));
        assert_eq!(catalog.searches().len(), 1);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence_order() {
        let (unique, duplicates) = dedupe_and_cap(ids(&["b", "a", "b", "c", "a"]), 0);
        assert_eq!(unique, ids(&["b", "a", "c"]));
        assert_eq!(duplicates, 2);
    }

    #[test]
    fn test_cap_applies_after_dedupe() {
        let (unique, duplicates) = dedupe_and_cap(ids(&["a", "a", "b", "c", "d"]), 2);
        assert_eq!(unique, ids(&["a", "b"]));
        assert_eq!(duplicates, 1);
    }
}
