//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\openbroadcast-playlist\config.toml
//! - macOS: ~/Library/Application Support/openbroadcast-playlist/config.toml
//! - Linux: ~/.config/openbroadcast-playlist/config.toml
//!
//! The config file is human-readable and editable. Every section falls back
//! to defaults, so a partial file is fine. A file that fails to parse is an
//! error: a scheduled run must not quietly proceed with settings nobody
//! asked for.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::builder::{Backoff, BuildSettings, RetryPolicy};
use crate::catalog::auth::DEFAULT_SCOPES;
use crate::harvest::{BrowserSettings, GrowthSettings};
use crate::model::PlaylistMode;

const APP_DIR: &str = "openbroadcast-playlist";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discovery page and its markup layout
    pub source: SourceConfig,

    /// Page growth and extraction
    pub harvest: HarvestConfig,

    /// Catalog credentials (environment variables take precedence)
    pub catalog: CatalogConfig,

    /// Target playlist
    pub playlist: PlaylistConfig,

    /// Retry policy for catalog calls
    pub retry: RetryConfig,

    /// Run log
    pub logging: LoggingConfig,
}

/// Discovery page settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    /// CSS selector matching one track row
    pub row_selector: String,
    /// CSS selector for the title, relative to a row
    pub title_selector: String,
    /// CSS selector for the artist, relative to a row
    pub artist_selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "https://openbroadcast.ch/discover/tracks/".to_string(),
            row_selector: "div.media-row".to_string(),
            title_selector: "div.name a".to_string(),
            artist_selector: "a.artist__name".to_string(),
        }
    }
}

/// Harvester settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Query file written by the harvester and read by the builder
    pub output: PathBuf,
    pub stall_limit: u32,
    /// 0 = unlimited
    pub max_iterations: u32,
    /// 0 = unlimited
    pub max_records: usize,
    pub settle_delay_ms: u64,
    pub stall_delay_ms: u64,
    pub step_timeout_secs: u64,
    /// Chrome/Chromium binary (unset = auto-detect)
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        let growth = GrowthSettings::default();
        let browser = BrowserSettings::default();
        Self {
            output: PathBuf::from("tracks.txt"),
            stall_limit: growth.stall_limit,
            max_iterations: growth.max_iterations,
            max_records: 0,
            settle_delay_ms: growth.settle_delay.as_millis() as u64,
            stall_delay_ms: growth.stall_delay.as_millis() as u64,
            step_timeout_secs: browser.step_timeout.as_secs(),
            chrome_path: None,
            headless: browser.headless,
            window_width: browser.window_size.0,
            window_height: browser.window_size.1,
        }
    }
}

impl HarvestConfig {
    pub fn growth_settings(&self) -> GrowthSettings {
        GrowthSettings {
            stall_limit: self.stall_limit,
            max_iterations: self.max_iterations,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            stall_delay: Duration::from_millis(self.stall_delay_ms),
        }
    }

    pub fn browser_settings(&self) -> BrowserSettings {
        BrowserSettings {
            chrome_path: self.chrome_path.clone(),
            headless: self.headless,
            window_size: (self.window_width, self.window_height),
            step_timeout: Duration::from_secs(self.step_timeout_secs),
        }
    }
}

/// Catalog credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// Overrides the token cache when set
    pub refresh_token: Option<String>,
    pub scopes: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            refresh_token: None,
            scopes: DEFAULT_SCOPES.to_string(),
        }
    }
}

/// Target playlist settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub name: String,
    pub public: bool,
    pub mode: PlaylistMode,
    /// Cap on tracks written to the playlist (0 = unlimited)
    pub max_tracks: usize,
    pub batch_size: usize,
    pub search_limit: u32,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        let build = BuildSettings::default();
        Self {
            name: build.playlist_name,
            public: build.public,
            mode: build.mode,
            max_tracks: build.max_tracks,
            batch_size: build.batch_size,
            search_limit: build.search_limit,
        }
    }
}

impl PlaylistConfig {
    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            playlist_name: self.name.clone(),
            public: self.public,
            mode: self.mode,
            batch_size: self.batch_size,
            search_limit: self.search_limit,
            max_tracks: self.max_tracks,
            dry_run: false,
        }
    }
}

/// Retry settings for catalog calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    pub attempts: u32,
    pub delay_ms: u64,
    pub backoff: Backoff,
    /// Timeout for a single HTTP request
    pub request_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            attempts: policy.attempts,
            delay_ms: policy.delay.as_millis() as u64,
            backoff: policy.backoff,
            request_timeout_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts,
            delay: Duration::from_millis(self.delay_ms),
            backoff: self.backoff,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Run log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only log file (unset = stderr only)
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive, used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("app.log")),
            filter: "openbroadcast_playlist=info".to_string(),
        }
    }
}

impl Config {
    /// Copy with every secret replaced by a mask, for display.
    pub fn redacted(&self) -> Self {
        fn mask(value: &Option<String>) -> Option<String> {
            value.as_ref().map(|_| "********".to_string())
        }

        let mut copy = self.clone();
        copy.catalog.client_secret = mask(&self.catalog.client_secret);
        copy.catalog.refresh_token = mask(&self.catalog.refresh_token);
        copy
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file yields the defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Some(path) => path,
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                return Ok(Config::default());
            }
        },
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.clone(), e))?;
    let config = parse(&contents).map_err(|e| ConfigError::Parse(path.clone(), e))?;
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Parse configuration text.
pub fn parse(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

/// Save configuration to `path`, or to the default location.
///
/// Creates the parent directory if it doesn't exist. Returns the path written.
pub fn save(config: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(path)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[source]"));
        assert!(toml.contains("[harvest]"));
        assert!(toml.contains("[playlist]"));
        assert!(toml.contains("[retry]"));
        assert!(toml.contains("mode = \"replace\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.catalog.client_id = Some("client-123".to_string());
        config.playlist.mode = PlaylistMode::Append;
        config.retry.backoff = Backoff::Exponential;
        config.harvest.max_records = 40;

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed = parse(&toml).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[playlist]
name = "Night Shift"
max_tracks = 0

[retry]
attempts = 5
"#;
        let config = parse(toml).unwrap();

        assert_eq!(config.playlist.name, "Night Shift");
        assert_eq!(config.playlist.max_tracks, 0);
        assert_eq!(config.retry.attempts, 5);

        assert_eq!(config.playlist.mode, PlaylistMode::Replace);
        assert_eq!(config.retry.delay_ms, 5000);
        assert_eq!(config.harvest.stall_limit, 5);
        assert_eq!(config.source.row_selector, "div.media-row");
    }

    #[test]
    fn test_playlist_is_public_by_default() {
        assert!(PlaylistConfig::default().public);
        assert!(Config::default().playlist.build_settings().public);
        assert!(parse("[playlist]\nname = \"Mix\"\n").unwrap().playlist.public);
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        assert!(parse("[playlist]\nmode = \"merge\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_broken_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[harvest\nstall_limit = ").unwrap();
        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse(..))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.playlist.public = false;

        let written = save(&config, Some(&path)).unwrap();

        assert_eq!(written, path);
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_redacted_masks_secrets_only() {
        let mut config = Config::default();
        config.catalog.client_id = Some("visible".to_string());
        config.catalog.client_secret = Some("hidden".to_string());
        config.catalog.refresh_token = Some("also-hidden".to_string());

        let shown = toml::to_string_pretty(&config.redacted()).unwrap();

        assert!(shown.contains("visible"));
        assert!(!shown.contains("hidden"));
    }

    #[test]
    fn test_section_conversions() {
        let config = parse("[harvest]\nsettle_delay_ms = 250\nwindow_width = 800\n").unwrap();
        let growth = config.harvest.growth_settings();
        assert_eq!(growth.settle_delay, Duration::from_millis(250));
        assert_eq!(config.harvest.browser_settings().window_size.0, 800);
        assert_eq!(config.retry.policy(), RetryPolicy::default());
    }
}
