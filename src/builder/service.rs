//! Build service - orchestrates one playlist build
//!
//! 1. Resolve every query to its first catalog match (skip on failure)
//! 2. Deduplicate the ids and apply the track cap
//! 3. Find or create the playlist
//! 4. Replace or append its membership in batches

use super::resolve::{ResolveCounts, dedupe_and_cap, resolve_all};
use super::{BuildError, PlaylistTarget, Resolution, RetryPolicy, commit, resolve_target};
use crate::catalog::{CatalogApi, MAX_BATCH_SIZE};
use crate::model::{CatalogTrackId, PlaylistMode, SearchQuery};

/// Settings for a build run
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub playlist_name: String,
    pub public: bool,
    pub mode: PlaylistMode,
    /// Ids per playlist mutation call (clamped to the service maximum)
    pub batch_size: usize,
    /// Results requested per search call
    pub search_limit: u32,
    /// Cap on submitted tracks (0 = unlimited)
    pub max_tracks: usize,
    /// Resolve only; leave the playlist untouched
    pub dry_run: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            playlist_name: "Open Broadcast Tracks".to_string(),
            public: true,
            mode: PlaylistMode::Replace,
            batch_size: MAX_BATCH_SIZE,
            search_limit: 50,
            max_tracks: 200,
            dry_run: false,
        }
    }
}

/// Counts accumulated during a build run.
///
/// Filled in as the run progresses, so an aborted run still reports
/// partial progress.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub queries: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub failed: usize,
    pub duplicates: usize,
    /// Ids that were ready to submit after dedupe and cap
    pub ready: usize,
    /// Ids actually written to the playlist
    pub submitted: usize,
    pub batches: usize,
    pub playlist: Option<PlaylistTarget>,
}

impl BuildReport {
    /// Log the run summary.
    pub fn log_summary(&self) {
        tracing::info!(
            queries = self.queries,
            resolved = self.resolved,
            unresolved = self.unresolved,
            failed = self.failed,
            duplicates = self.duplicates,
            tracks_added = self.submitted,
            batches = self.batches,
            playlist = self.playlist.as_ref().map(|p| p.id.as_str()).unwrap_or("-"),
            "Build summary"
        );
    }
}

/// Run a full build against an authenticated catalog session.
///
/// Returns the ids that were (or, on a dry run, would have been) submitted.
pub async fn run<C: CatalogApi + ?Sized>(
    catalog: &C,
    policy: &RetryPolicy,
    queries: &[SearchQuery],
    settings: &BuildSettings,
    report: &mut BuildReport,
) -> Result<Vec<CatalogTrackId>, BuildError> {
    report.queries = queries.len();
    tracing::info!(queries = queries.len(), "Resolving queries");

    let mut counts = ResolveCounts::default();
    let outcome = resolve_all(catalog, policy, queries, settings.search_limit, &mut counts).await;
    report.resolved = counts.resolved;
    report.unresolved = counts.unresolved;
    report.failed = counts.failed;
    let resolutions = outcome?;

    if counts.failed > 0 && counts.resolved == 0 {
        return Err(BuildError::SearchesFailed {
            failed: counts.failed,
        });
    }

    let resolved = resolutions.into_iter().filter_map(|(_, resolution)| match resolution {
        Resolution::Resolved(found) => Some(found.id),
        Resolution::Unresolved | Resolution::Failed(_) => None,
    });
    let (ids, duplicates) = dedupe_and_cap(resolved, settings.max_tracks);
    report.duplicates = duplicates;
    report.ready = ids.len();

    if settings.dry_run {
        tracing::info!(tracks = ids.len(), "Dry run, playlist left untouched");
        return Ok(ids);
    }

    let user = policy.run("current user", || catalog.current_user()).await?;
    tracing::debug!(user = %user.id, "Authenticated catalog user");

    let target = resolve_target(
        catalog,
        policy,
        &user.id,
        &settings.playlist_name,
        settings.public,
    )
    .await?;
    report.playlist = Some(target.clone());

    report.batches = commit(
        catalog,
        policy,
        &target,
        &ids,
        settings.mode,
        settings.batch_size,
    )
    .await?;
    report.submitted = ids.len();

    Ok(ids)
}
