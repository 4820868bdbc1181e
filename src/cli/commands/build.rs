//! Build command: query file to playlist.

use tokio::runtime::Runtime;

use crate::builder::{self, BuildError, BuildReport, BuildSettings, RetryPolicy};
use crate::catalog::auth::{load_token_cache, save_token_cache, token_cache_path};
use crate::catalog::{AuthClient, CatalogError, SpotifyClient, TokenCache};
use crate::config::Config;
use crate::error::Result;
use crate::model::SearchQuery;
use crate::query_file;

use super::{BuildArgs, CatalogArgs};

/// Resolve the query file against the catalog and update the playlist
pub fn cmd_build(rt: &Runtime, config: &Config, args: &BuildArgs) -> Result<()> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.harvest.output.clone());
    let queries = query_file::read(&input)?;
    tracing::info!(path = %input.display(), count = queries.len(), "Loaded queries");

    let mut settings = config.playlist.build_settings();
    if let Some(name) = &args.playlist {
        settings.playlist_name = name.clone();
    }
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
    if let Some(max_tracks) = args.max_tracks {
        settings.max_tracks = max_tracks;
    }
    settings.dry_run = args.dry_run;

    let policy = config.retry.policy();

    let mut report = BuildReport::default();
    let result = rt.block_on(execute(config, args, &queries, &settings, &policy, &mut report));
    report.log_summary();
    result
}

/// Connect and run the build, filling `report` as far as the run gets.
async fn execute(
    config: &Config,
    args: &BuildArgs,
    queries: &[SearchQuery],
    settings: &BuildSettings,
    policy: &RetryPolicy,
    report: &mut BuildReport,
) -> Result<()> {
    report.queries = queries.len();
    let client = connect(config, &args.catalog, policy).await?;
    builder::run(&client, policy, queries, settings, report).await?;
    Ok(())
}

/// Refresh an access token and bind a client to it.
///
/// The refresh token comes from flags, environment or config, falling back
/// to the token cache written by `authorize`. A rotated refresh token is
/// written back to the cache.
async fn connect(config: &Config, args: &CatalogArgs, policy: &RetryPolicy) -> Result<SpotifyClient> {
    let credentials = args.credentials(&config.catalog)?;
    let cache_path = token_cache_path();

    let refresh_token = match args.refresh_token(&config.catalog) {
        Some(token) => token,
        None => {
            let cached = match &cache_path {
                Some(path) => load_token_cache(path)?,
                None => None,
            };
            cached
                .map(|cache| cache.refresh_token)
                .ok_or_else(|| CatalogError::Auth("no refresh token; run `authorize` first".to_string()))?
        }
    };

    let timeout = config.retry.request_timeout();
    let auth = AuthClient::new(timeout)?;
    let grant = policy
        .run("refresh token", || auth.refresh(&credentials, &refresh_token))
        .await
        .map_err(BuildError::from)?;
    tracing::info!(expires_at = %grant.expires_at, "Access token refreshed");

    if let (Some(rotated), Some(path)) = (&grant.refresh_token, &cache_path) {
        if *rotated != refresh_token {
            save_token_cache(path, &TokenCache::new(rotated.clone(), grant.scope.clone()))?;
        }
    }

    Ok(SpotifyClient::new(grant.access_token, timeout)?)
}
