//! Scroll-until-stalled growth loop.
//!
//! Each iteration triggers a lazy-loading step, waits for the page to
//! settle and compares the document height with the previous reading.
//! Consecutive unchanged readings increment a stall counter; any change
//! resets it. The loop ends when the counter reaches the stall limit, or
//! when the hard iteration cap is hit.

use std::time::Duration;

use super::{HarvestError, PageSession};

/// Tuning knobs for the growth loop
#[derive(Debug, Clone)]
pub struct GrowthSettings {
    /// Consecutive no-change observations that mean "exhausted"
    pub stall_limit: u32,
    /// Hard cap on growth steps (0 = unlimited)
    pub max_iterations: u32,
    /// Wait after every growth step before reading the proxy
    pub settle_delay: Duration,
    /// Extra wait after a step that produced no new content
    pub stall_delay: Duration,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            stall_limit: 5,
            max_iterations: 200,
            settle_delay: Duration::from_secs(10),
            stall_delay: Duration::from_secs(10),
        }
    }
}

/// Why the growth loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStop {
    /// The stall limit was reached: no more content to load
    Exhausted,
    /// The iteration cap was reached while content was still changing
    IterationCap,
}

/// Result of a completed growth loop
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthOutcome {
    /// Growth steps performed
    pub iterations: u32,
    /// Last proxy reading
    pub final_proxy: f64,
    pub stop: GrowthStop,
}

/// Grow the page until loading stalls.
pub fn grow<S: PageSession + ?Sized>(
    session: &mut S,
    settings: &GrowthSettings,
) -> Result<GrowthOutcome, HarvestError> {
    let mut last_proxy = session.read_growth_proxy()?;
    let mut stalls = 0u32;
    let mut iterations = 0u32;

    while stalls < settings.stall_limit {
        if settings.max_iterations > 0 && iterations >= settings.max_iterations {
            tracing::warn!(
                iterations,
                proxy = last_proxy,
                "Iteration cap reached before the page stopped growing"
            );
            return Ok(GrowthOutcome {
                iterations,
                final_proxy: last_proxy,
                stop: GrowthStop::IterationCap,
            });
        }

        session.trigger_growth_step()?;
        pause(settings.settle_delay);
        let proxy = session.read_growth_proxy()?;
        iterations += 1;

        if proxy == last_proxy {
            stalls += 1;
            tracing::info!(
                "No new content loaded. Attempt {}/{}",
                stalls,
                settings.stall_limit
            );
            if stalls < settings.stall_limit {
                pause(settings.stall_delay);
            }
        } else {
            stalls = 0;
        }
        last_proxy = proxy;

        tracing::info!(
            iteration = iterations,
            height = proxy,
            "Scrolled to bottom of page"
        );
    }

    Ok(GrowthOutcome {
        iterations,
        final_proxy: last_proxy,
        stop: GrowthStop::Exhausted,
    })
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::session::mocks::{EndlessPage, MockPage, SequencePage};

    fn instant(stall_limit: u32, max_iterations: u32) -> GrowthSettings {
        GrowthSettings {
            stall_limit,
            max_iterations,
            settle_delay: Duration::ZERO,
            stall_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_stops_after_growth_plus_stall_limit() {
        let mut page = MockPage::growing(3, "");
        let outcome = grow(&mut page, &instant(5, 0)).unwrap();

        assert_eq!(page.steps, 8);
        assert_eq!(outcome.iterations, 8);
        assert_eq!(outcome.stop, GrowthStop::Exhausted);
        assert_eq!(outcome.final_proxy, 2500.0);
    }

    #[test]
    fn test_static_page_stops_after_stall_limit() {
        let mut page = MockPage::static_page("");
        let outcome = grow(&mut page, &instant(5, 0)).unwrap();
        assert_eq!(outcome.iterations, 5);
    }

    #[test]
    fn test_iteration_cap_bounds_endless_page() {
        let mut page = EndlessPage { steps: 0 };
        let outcome = grow(&mut page, &instant(5, 12)).unwrap();

        assert_eq!(page.steps, 12);
        assert_eq!(outcome.stop, GrowthStop::IterationCap);
    }

    #[test]
    fn test_zero_stall_limit_performs_no_steps() {
        let mut page = MockPage::growing(3, "");
        let outcome = grow(&mut page, &instant(0, 0)).unwrap();
        assert_eq!(outcome.iterations, 0);
        assert_eq!(page.steps, 0);
    }

    #[test]
    fn test_growth_resets_stall_counter() {
        // Two stalls, one growth, then three stalls. Without the reset the
        // loop would stop after the fourth step.
        let mut page = SequencePage::new(&[1000.0, 1000.0, 1000.0, 1500.0, 1500.0]);
        let outcome = grow(&mut page, &instant(3, 100)).unwrap();

        assert_eq!(page.steps, 6);
        assert_eq!(outcome.iterations, 6);
        assert_eq!(outcome.final_proxy, 1500.0);
        assert_eq!(outcome.stop, GrowthStop::Exhausted);
    }
}
