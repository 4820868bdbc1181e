//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `harvest`: Grow the discovery page and write the query file
//! - `build`: Resolve the query file and update the playlist
//! - `authorize`: One-time catalog authorization
//! - `settings`: Show or initialize the configuration

mod authorize;
mod build;
mod harvest;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tokio::runtime::Runtime;

use crate::catalog::{CatalogError, OAuthCredentials};
use crate::config::{CatalogConfig, Config, ConfigError};
use crate::error::Error;
use crate::model::PlaylistMode;

pub use authorize::cmd_authorize;
pub use build::cmd_build;
pub use harvest::cmd_harvest;
pub use settings::cmd_config;

/// Open Broadcast playlist builder
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: OS config directory)
    #[arg(long, global = true, env = "OPENBROADCAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Append the run log to this file instead of the configured one
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Scroll the discovery page and write one search query per track
    Harvest(HarvestArgs),
    /// Resolve the query file against the catalog and update the playlist
    Build(BuildArgs),
    /// Authorize playlist access and cache the refresh token
    Authorize(AuthorizeArgs),
    /// Show the effective configuration, or write a default config file
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Harvest(_) => "harvest",
            Self::Build(_) => "build",
            Self::Authorize(_) => "authorize",
            Self::Config { .. } => "config",
        }
    }
}

#[derive(Args)]
pub struct HarvestArgs {
    /// Discovery page URL
    #[arg(long, env = "OPENBROADCAST_URL")]
    pub url: Option<String>,
    /// Query file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Stop after this many tracks (0 = unlimited)
    #[arg(long)]
    pub max_records: Option<usize>,
    /// Unchanged page heights in a row before giving up
    #[arg(long)]
    pub stall_limit: Option<u32>,
    /// Hard cap on scroll steps (0 = unlimited)
    #[arg(long)]
    pub max_iterations: Option<u32>,
    /// Show the browser window
    #[arg(long)]
    pub show_browser: bool,
    /// Also print the queries to stdout
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Query file to read (default: the harvest output)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Playlist name
    #[arg(short, long)]
    pub playlist: Option<String>,
    /// replace or append
    #[arg(short, long)]
    pub mode: Option<PlaylistMode>,
    /// Cap on tracks written to the playlist (0 = unlimited)
    #[arg(long)]
    pub max_tracks: Option<usize>,
    /// Resolve and report without touching the playlist
    #[arg(long)]
    pub dry_run: bool,
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Args)]
pub struct AuthorizeArgs {
    /// Redirect URL or bare authorization code (prompted for when omitted)
    #[arg(long)]
    pub code: Option<String>,
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Catalog credentials from flags or environment; config fills the gaps
#[derive(Args, Default)]
pub struct CatalogArgs {
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
    #[arg(long, env = "SPOTIFY_REDIRECT_URI")]
    pub redirect_uri: Option<String>,
    #[arg(long, env = "SPOTIFY_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,
}

impl CatalogArgs {
    pub fn credentials(&self, config: &CatalogConfig) -> Result<OAuthCredentials, CatalogError> {
        OAuthCredentials::from_parts(
            self.client_id.clone().or_else(|| config.client_id.clone()),
            self.client_secret.clone().or_else(|| config.client_secret.clone()),
            self.redirect_uri.clone().or_else(|| config.redirect_uri.clone()),
        )
    }

    pub fn refresh_token(&self, config: &CatalogConfig) -> Option<String> {
        self.refresh_token
            .clone()
            .or_else(|| config.refresh_token.clone())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Run the specified CLI command.
///
/// Every run is bracketed by start/end markers in the log. A failure is
/// logged with its kind before being returned.
pub fn run_command(
    cli: &Cli,
    loaded: Result<Config, ConfigError>,
) -> anyhow::Result<()> {
    let name = cli.command.name();
    tracing::info!("**** {name} started ****");
    let started = Instant::now();

    let result = loaded
        .map_err(Error::from)
        .and_then(|config| dispatch(cli, &config));

    if let Err(e) = &result {
        tracing::error!(kind = e.kind(), "{name} failed: {e}");
    }
    tracing::info!("Total run time: {:.2}s", started.elapsed().as_secs_f64());
    tracing::info!("**** {name} ended ****");

    result.map_err(anyhow::Error::from)
}

fn dispatch(cli: &Cli, config: &Config) -> crate::error::Result<()> {
    match &cli.command {
        Commands::Harvest(args) => cmd_harvest(config, args),
        Commands::Build(args) => {
            let rt = Runtime::new()?;
            cmd_build(&rt, config, args)
        }
        Commands::Authorize(args) => {
            let rt = Runtime::new()?;
            cmd_authorize(&rt, config, args)
        }
        Commands::Config { init, force } => cmd_config(config, cli.config.as_deref(), *init, *force),
    }
}
