//! Playlist builder - resolves queries and commits them to a playlist.
//!
//! - **Retry** (`retry.rs`) - bounded retry wrapper around every catalog call
//! - **Resolve** (`resolve.rs`) - query to first-match track id, dedupe, cap
//! - **Commit** (`commit.rs`) - find or create the playlist, write batches
//! - **Service** (`service.rs`) - orchestration of a whole build run
//!
//! Failure policy: a search that exhausts its retries is skipped and
//! counted; anything that touches the playlist is fatal. Authentication
//! failures are fatal wherever they occur. A run in which every attempted
//! search failed and none resolved stops before the playlist is touched.

pub mod commit;
pub mod resolve;
pub mod retry;
pub mod service;

pub use commit::{PlaylistTarget, commit, resolve_target};
pub use resolve::{Resolution, dedupe_and_cap, resolve_all, resolve_query};
pub use retry::{Backoff, RetryError, RetryPolicy};
pub use service::{BuildReport, BuildSettings, run};

use crate::catalog::CatalogError;

/// Errors that abort a build run
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Credentials rejected; never retried
    #[error("Catalog authentication failed: {0}")]
    Auth(CatalogError),

    /// A fatal catalog call ran out of attempts or failed terminally
    #[error(transparent)]
    Catalog(RetryError),

    /// Searches failed and nothing resolved; committing would wipe the playlist
    #[error("{failed} searches failed and none resolved; playlist left untouched")]
    SearchesFailed { failed: usize },
}

impl From<RetryError> for BuildError {
    fn from(e: RetryError) -> Self {
        if e.source.is_auth() {
            Self::Auth(e.source)
        } else {
            Self::Catalog(e)
        }
    }
}

impl BuildError {
    /// Short failure class used in log entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "catalog-auth",
            Self::Catalog(_) | Self::SearchesFailed { .. } => "catalog",
        }
    }
}
