//! Trait definition for the page-rendering engine.
//!
//! The growth loop and the harvest service only talk to this trait.
//! Production code uses [`super::ChromeSession`]; tests substitute the
//! mocks below.

use super::HarvestError;

/// A rendered page that can be grown by lazy loading.
///
/// Acquiring a session means constructing one; it is released when dropped.
pub trait PageSession {
    /// Load `url` and wait for the initial render.
    fn navigate(&mut self, url: &str) -> Result<(), HarvestError>;

    /// Trigger one lazy-loading step (scroll to the bottom).
    fn trigger_growth_step(&mut self) -> Result<(), HarvestError>;

    /// Read the content-size proxy used to detect growth (document height).
    fn read_growth_proxy(&mut self) -> Result<f64, HarvestError>;

    /// The full rendered markup of the current page.
    fn rendered_markup(&mut self) -> Result<String, HarvestError>;
}
