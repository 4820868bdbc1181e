//! Harvest command: discovery page to query file.

use crate::config::Config;
use crate::error::Result;
use crate::harvest::{self, ChromeSession, HarvestReport, HarvestSettings, TrackSelectors};

use super::HarvestArgs;

/// Grow the discovery page in a headless browser and write the query file
pub fn cmd_harvest(config: &Config, args: &HarvestArgs) -> Result<()> {
    let source = &config.source;
    let selectors = TrackSelectors::parse(
        &source.row_selector,
        &source.title_selector,
        &source.artist_selector,
    )?;

    let mut growth = config.harvest.growth_settings();
    if let Some(stall_limit) = args.stall_limit {
        growth.stall_limit = stall_limit;
    }
    if let Some(max_iterations) = args.max_iterations {
        growth.max_iterations = max_iterations;
    }

    let mut browser = config.harvest.browser_settings();
    if args.show_browser {
        browser.headless = false;
    }

    let settings = HarvestSettings {
        url: args.url.clone().unwrap_or_else(|| source.url.clone()),
        growth,
        max_records: args.max_records.unwrap_or(config.harvest.max_records),
        output: args
            .output
            .clone()
            .unwrap_or_else(|| config.harvest.output.clone()),
    };
    tracing::info!(
        url = %settings.url,
        stall_limit = settings.growth.stall_limit,
        max_iterations = settings.growth.max_iterations,
        "Harvesting tracks"
    );

    let mut report = HarvestReport::default();
    // The session is dropped inside the closure, so the browser is gone
    // before the summary is logged, whatever the outcome.
    let result = (|| {
        let mut session = ChromeSession::launch(&browser)?;
        harvest::run(&mut session, &selectors, &settings, &mut report)
    })();
    report.log_summary();
    let queries = result?;

    if args.stdout {
        for query in &queries {
            println!("{query}");
        }
    }
    Ok(())
}
