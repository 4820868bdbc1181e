//! Playlist commit: find or create the target, then write its membership.

use super::{BuildError, RetryPolicy};
use crate::catalog::{CatalogApi, MAX_BATCH_SIZE};
use crate::model::{CatalogTrackId, PlaylistMode};

/// The playlist a build writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistTarget {
    pub id: String,
    pub name: String,
    /// Created during this run rather than found
    pub created: bool,
}

/// Look the playlist up by exact name; create it when absent.
///
/// Duplicate names resolve to the first playlist in listing order.
pub async fn resolve_target<C: CatalogApi + ?Sized>(
    catalog: &C,
    policy: &RetryPolicy,
    user_id: &str,
    name: &str,
    public: bool,
) -> Result<PlaylistTarget, BuildError> {
    let playlists = policy
        .run("list playlists", || catalog.list_user_playlists(user_id))
        .await?;

    let mut matching = playlists.iter().filter(|p| p.name == name);
    if let Some(found) = matching.next() {
        let others: Vec<&str> = matching.map(|p| p.id.as_str()).collect();
        if !others.is_empty() {
            tracing::warn!(
                name,
                chosen = %found.id,
                ignored = ?others,
                "Several playlists share this name, using the first one listed"
            );
        }
        tracing::info!(name, id = %found.id, tracks = ?found.track_count, "Found playlist");
        return Ok(PlaylistTarget {
            id: found.id.clone(),
            name: found.name.clone(),
            created: false,
        });
    }

    let created = policy
        .run("create playlist", || catalog.create_playlist(user_id, name, public))
        .await?;
    tracing::info!(name, id = %created.id, public, "Created playlist");

    Ok(PlaylistTarget {
        id: created.id,
        name: created.name,
        created: true,
    })
}

/// Write `ids` into the playlist. Returns the number of batch calls made.
///
/// In replace mode the first batch replaces the whole membership and later
/// batches append, so an empty id set still clears the playlist. Each batch
/// is retried as a unit; exhaustion aborts the commit.
pub async fn commit<C: CatalogApi + ?Sized>(
    catalog: &C,
    policy: &RetryPolicy,
    target: &PlaylistTarget,
    ids: &[CatalogTrackId],
    mode: PlaylistMode,
    batch_size: usize,
) -> Result<usize, BuildError> {
    let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
    let playlist_id = target.id.as_str();

    if ids.is_empty() {
        return match mode {
            PlaylistMode::Replace => {
                policy
                    .run("replace tracks", || catalog.replace_tracks(playlist_id, &[]))
                    .await?;
                tracing::info!(playlist = %target.name, "Cleared playlist, nothing to add");
                Ok(1)
            }
            PlaylistMode::Append => {
                tracing::info!(playlist = %target.name, "Nothing to append");
                Ok(0)
            }
        };
    }

    let mut batches = 0;
    for (index, batch) in ids.chunks(batch_size).enumerate() {
        if index == 0 && mode == PlaylistMode::Replace {
            policy
                .run("replace tracks", || catalog.replace_tracks(playlist_id, batch))
                .await?;
        } else {
            policy
                .run("add tracks", || catalog.add_tracks(playlist_id, batch))
                .await?;
        }
        batches += 1;
        tracing::debug!(batch = index + 1, size = batch.len(), "Committed batch");
    }

    tracing::info!(
        playlist = %target.name,
        mode = %mode,
        tracks = ids.len(),
        batches,
        "Playlist updated"
    );
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::catalog::traits::mocks::{Call, MockCatalog};
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn ids(raw: &[&str]) -> Vec<CatalogTrackId> {
        raw.iter().map(|s| CatalogTrackId::new(*s)).collect()
    }

    fn target(id: &str, name: &str) -> PlaylistTarget {
        PlaylistTarget {
            id: id.to_string(),
            name: name.to_string(),
            created: false,
        }
    }

    #[tokio::test]
    async fn test_replace_converges_in_single_call() {
        let catalog = MockCatalog::new().with_playlist("p1", "Mix", &["a", "b"]);
        let batches = commit(
            &catalog,
            &policy(),
            &target("p1", "Mix"),
            &ids(&["c", "d", "e"]),
            PlaylistMode::Replace,
            100,
        )
        .await
        .unwrap();

        assert_eq!(batches, 1);
        assert_eq!(catalog.playlist("Mix").unwrap().tracks, vec!["c", "d", "e"]);
        assert_eq!(
            catalog.calls(),
            vec![Call::Replace {
                playlist_id: "p1".into(),
                ids: vec!["c".into(), "d".into(), "e".into()]
            }]
        );
    }

    #[tokio::test]
    async fn test_replace_twice_is_idempotent() {
        let catalog = MockCatalog::new().with_playlist("p1", "Mix", &["a"]);
        let set = ids(&["c", "d"]);
        for _ in 0..2 {
            commit(&catalog, &policy(), &target("p1", "Mix"), &set, PlaylistMode::Replace, 100)
                .await
                .unwrap();
        }
        assert_eq!(catalog.playlist("Mix").unwrap().tracks, vec!["c", "d"]);
    }

    #[tokio::test]
    async fn test_append_keeps_existing_tracks() {
        let catalog = MockCatalog::new().with_playlist("p1", "Mix", &["a", "b"]);
        commit(
            &catalog,
            &policy(),
            &target("p1", "Mix"),
            &ids(&["c"]),
            PlaylistMode::Append,
            100,
        )
        .await
        .unwrap();

        assert_eq!(catalog.playlist("Mix").unwrap().tracks, vec!["a", "b", "c"]);
        assert!(matches!(&catalog.calls()[..], [Call::Add { .. }]));
    }

    #[tokio::test]
    async fn test_large_set_is_split_into_batches() {
        let catalog = MockCatalog::new().with_playlist("p1", "Mix", &["old"]);
        let raw: Vec<String> = (0..5).map(|i| format!("t{i}")).collect();
        let set: Vec<CatalogTrackId> = raw.iter().map(|s| CatalogTrackId::new(s.clone())).collect();

        let batches = commit(&catalog, &policy(), &target("p1", "Mix"), &set, PlaylistMode::Replace, 2)
            .await
            .unwrap();

        assert_eq!(batches, 3);
        let calls = catalog.calls();
        assert!(matches!(&calls[0], Call::Replace { ids, .. } if ids.len() == 2));
        assert!(matches!(&calls[1], Call::Add { ids, .. } if ids.len() == 2));
        assert!(matches!(&calls[2], Call::Add { ids, .. } if ids.len() == 1));
        assert_eq!(catalog.playlist("Mix").unwrap().tracks, raw);
    }

    #[tokio::test]
    async fn test_empty_set_clears_in_replace_mode() {
        let catalog = MockCatalog::new().with_playlist("p1", "Mix", &["a", "b"]);
        commit(&catalog, &policy(), &target("p1", "Mix"), &[], PlaylistMode::Replace, 100)
            .await
            .unwrap();
        assert!(catalog.playlist("Mix").unwrap().tracks.is_empty());
    }

    #[tokio::test]
    async fn test_empty_set_in_append_mode_makes_no_calls() {
        let catalog = MockCatalog::new().with_playlist("p1", "Mix", &["a"]);
        let batches = commit(&catalog, &policy(), &target("p1", "Mix"), &[], PlaylistMode::Append, 100)
            .await
            .unwrap();
        assert_eq!(batches, 0);
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_batch_is_retried_as_a_unit() {
        let catalog = MockCatalog::new()
            .with_playlist("p1", "Mix", &[])
            .failing("add", CatalogError::Timeout("30s".into()), 2);
        commit(
            &catalog,
            &policy(),
            &target("p1", "Mix"),
            &ids(&["a", "b"]),
            PlaylistMode::Append,
            100,
        )
        .await
        .unwrap();
        assert_eq!(catalog.playlist("Mix").unwrap().tracks, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_exhausted_batch_is_fatal() {
        let catalog = MockCatalog::new()
            .with_playlist("p1", "Mix", &[])
            .failing("replace", CatalogError::Network("down".into()), 3);
        let result = commit(
            &catalog,
            &policy(),
            &target("p1", "Mix"),
            &ids(&["a"]),
            PlaylistMode::Replace,
            100,
        )
        .await;
        assert!(matches!(result, Err(BuildError::Catalog(ref e)) if e.attempts == 3));
    }

    #[tokio::test]
    async fn test_resolve_target_creates_missing_playlist() {
        let catalog = MockCatalog::new().with_playlist("p1", "Other", &[]);
        let target = resolve_target(&catalog, &policy(), "me", "Mix", false)
            .await
            .unwrap();
        assert!(target.created);
        assert_eq!(target.id, "pl-2");
        assert_eq!(catalog.calls(), vec![Call::Create { name: "Mix".into(), public: false }]);
    }

    #[tokio::test]
    async fn test_resolve_target_first_duplicate_wins() {
        let catalog = MockCatalog::new()
            .with_playlist("p1", "Mix", &[])
            .with_playlist("p2", "Mix", &[]);
        let target = resolve_target(&catalog, &policy(), "me", "Mix", false)
            .await
            .unwrap();
        assert_eq!(target.id, "p1");
        assert!(!target.created);
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_target_name_match_is_exact() {
        let catalog = MockCatalog::new().with_playlist("p1", "mix", &[]);
        let target = resolve_target(&catalog, &policy(), "me", "Mix", true)
            .await
            .unwrap();
        assert!(target.created);
    }
}
