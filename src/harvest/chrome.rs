//! Headless Chrome page session.
//!
//! Launches a private Chrome instance with a single tab. Every tab
//! operation is bounded by the step timeout. Dropping the session closes
//! the tab and kills the browser process, on success and failure alike.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};

use super::{HarvestError, PageSession};

/// JavaScript expression reading the growth proxy
const HEIGHT_EXPR: &str = "document.body.scrollHeight";
/// JavaScript statement triggering lazy loading
const SCROLL_EXPR: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Chrome/Chromium binary (None = auto-detect)
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Upper bound for any single tab operation
    pub step_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            window_size: (1280, 1024),
            step_timeout: Duration::from_secs(60),
        }
    }
}

/// A running browser with one tab, owned for the length of a harvest
pub struct ChromeSession {
    // Kept alive for the tab; dropping it terminates the process.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Launch a browser and open a tab.
    pub fn launch(settings: &BrowserSettings) -> Result<Self, HarvestError> {
        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .path(settings.chrome_path.clone())
            .window_size(Some(settings.window_size))
            // The browser sits idle while the page settles between steps
            .idle_browser_timeout(settings.step_timeout.max(Duration::from_secs(300)))
            .build()
            .map_err(|e| HarvestError::rendering("launch", e))?;

        let browser = Browser::new(options).map_err(|e| HarvestError::rendering("launch", format!("{e:#}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| HarvestError::rendering("open tab", format!("{e:#}")))?;
        tab.set_default_timeout(settings.step_timeout);

        tracing::info!(headless = settings.headless, "Browser launched");
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    fn evaluate(&self, operation: &str, expression: &str) -> Result<Option<serde_json::Value>, HarvestError> {
        let result = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| HarvestError::rendering(operation, format!("{e:#}")))?;
        Ok(result.value)
    }
}

impl PageSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<(), HarvestError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| HarvestError::rendering("navigate", format!("{e:#}")))?;
        tracing::info!(%url, "Page loaded successfully");
        Ok(())
    }

    fn trigger_growth_step(&mut self) -> Result<(), HarvestError> {
        self.evaluate("scroll", SCROLL_EXPR)?;
        Ok(())
    }

    fn read_growth_proxy(&mut self) -> Result<f64, HarvestError> {
        let value = self.evaluate("read height", HEIGHT_EXPR)?;
        value
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| HarvestError::InvalidProxy(format!("{value:?}")))
    }

    fn rendered_markup(&mut self) -> Result<String, HarvestError> {
        self.tab
            .get_content()
            .map_err(|e| HarvestError::rendering("read markup", format!("{e:#}")))
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            tracing::debug!("Failed to close tab cleanly: {e:#}");
        }
        tracing::info!("Browser session released");
    }
}
