//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`HarvestError`], [`CatalogError`], [`BuildError`])
//!   for detailed handling inside each pipeline
//! - [`Error::kind`] names the failure class for the run log

use crate::builder::BuildError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::harvest::HarvestError;
use crate::query_file::QueryFileError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Page rendering or extraction setup failed
    #[error("Harvest error: {0}")]
    Harvest(#[from] HarvestError),

    /// Catalog call failed outside the builder's retry handling
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Playlist build failed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Query file could not be read or written
    #[error("Query file error: {0}")]
    QueryFile(#[from] QueryFileError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl Error {
    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Short failure class used in log entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Harvest(HarvestError::QueryFile(_)) | Self::QueryFile(_) => "query-file",
            Self::Harvest(HarvestError::Selector { .. }) => "config",
            Self::Harvest(_) => "rendering",
            Self::Catalog(e) if e.is_auth() => "catalog-auth",
            Self::Catalog(_) => "catalog",
            Self::Build(e) => e.kind(),
            Self::Config(_) => "config",
            Self::WithContext { source, .. } => source.kind(),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
