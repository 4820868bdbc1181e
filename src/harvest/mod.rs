//! Harvester - grows the discovery page and extracts search queries.
//!
//! # Architecture
//!
//! - **Session** (`session.rs`) - the [`PageSession`] seam over the rendering engine
//! - **Chrome** (`chrome.rs`) - headless Chrome implementation of the seam
//! - **Growth** (`growth.rs`) - scroll-until-stalled loop driving lazy loading
//! - **Extract** (`extract.rs`) - one parse of the final markup into track records
//! - **Service** (`service.rs`) - orchestration of a whole harvest run
//!
//! # Usage
//!
//! ```ignore
//! use harvest::{ChromeSession, HarvestSettings, TrackSelectors};
//!
//! let mut session = ChromeSession::launch(&browser_settings)?;
//! let mut report = HarvestReport::default();
//! let queries = harvest::run(&mut session, &selectors, &settings, &mut report)?;
//! ```

pub mod chrome;
pub mod extract;
pub mod growth;
pub mod service;
pub mod session;

pub use chrome::{BrowserSettings, ChromeSession};
pub use extract::{Extraction, SkipReason, TrackSelectors, extract_records};
pub use growth::{GrowthOutcome, GrowthSettings, GrowthStop, grow};
pub use service::{HarvestReport, HarvestSettings, run};
pub use session::PageSession;

use crate::query_file::QueryFileError;

/// Errors that abort a harvest run
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("Rendering failed during {operation}: {message}")]
    Rendering { operation: String, message: String },

    #[error("Growth proxy is not a number: {0}")]
    InvalidProxy(String),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error(transparent)]
    QueryFile(#[from] QueryFileError),
}

impl HarvestError {
    /// Create a rendering error for the named browser operation.
    pub fn rendering(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Rendering {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}
