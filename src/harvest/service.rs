//! Harvest service - orchestrates one harvest run
//!
//! 1. Navigate to the discovery page
//! 2. Grow it until lazy loading stalls
//! 3. Parse the final markup into track records
//! 4. Write the queries to the query file (only on full success)

use std::path::PathBuf;

use super::{
    GrowthSettings, GrowthStop, HarvestError, PageSession, TrackSelectors, extract_records, grow,
};
use crate::model::SearchQuery;
use crate::query_file;

/// Settings for a harvest run
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Discovery page URL
    pub url: String,
    pub growth: GrowthSettings,
    /// Cap on extracted records (0 = unlimited)
    pub max_records: usize,
    /// Destination of the query file
    pub output: PathBuf,
}

/// Counts accumulated during a harvest run.
///
/// Filled in as the run progresses, so a failed run still reports how far
/// it got.
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    pub iterations: u32,
    pub final_height: Option<f64>,
    pub stop: Option<GrowthStop>,
    pub rows_found: usize,
    pub skipped: usize,
    pub capped: bool,
    pub queries_written: usize,
}

impl HarvestReport {
    /// Log the run summary.
    pub fn log_summary(&self) {
        tracing::info!(
            iterations = self.iterations,
            rows_found = self.rows_found,
            skipped = self.skipped,
            queries_written = self.queries_written,
            "Harvest summary"
        );
    }
}

/// Run a full harvest against an acquired page session.
pub fn run<S: PageSession + ?Sized>(
    session: &mut S,
    selectors: &TrackSelectors,
    settings: &HarvestSettings,
    report: &mut HarvestReport,
) -> Result<Vec<SearchQuery>, HarvestError> {
    session.navigate(&settings.url)?;

    let outcome = grow(session, &settings.growth)?;
    report.iterations = outcome.iterations;
    report.final_height = Some(outcome.final_proxy);
    report.stop = Some(outcome.stop);

    let markup = session.rendered_markup()?;
    tracing::debug!(bytes = markup.len(), "Rendered markup retrieved");

    let extraction = extract_records(&markup, selectors, settings.max_records);
    report.rows_found = extraction.rows_found;
    report.skipped = extraction.skipped.len();
    report.capped = extraction.capped;

    let queries: Vec<SearchQuery> = extraction.records.iter().map(|r| r.to_query()).collect();
    if queries.is_empty() {
        tracing::warn!(url = %settings.url, "No tracks found on the page");
    }

    query_file::write(&settings.output, &queries)?;
    report.queries_written = queries.len();
    tracing::info!(
        path = %settings.output.display(),
        count = queries.len(),
        "Track information extracted and written"
    );

    Ok(queries)
}
