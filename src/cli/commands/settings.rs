//! Configuration command.

use std::path::Path;

use crate::config::{self, Config};
use crate::error::{Error, Result};

/// Print the effective configuration, or write the defaults with `init`
pub fn cmd_config(config: &Config, path: Option<&Path>, init: bool, force: bool) -> Result<()> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => config::config_path().ok_or_else(|| Error::config("could not determine config directory"))?,
    };

    if init {
        if target.exists() && !force {
            return Err(Error::config(format!(
                "{} already exists (use --force to overwrite)",
                target.display()
            )));
        }
        let written = config::save(&Config::default(), Some(&target))?;
        println!("✓ Wrote default configuration to {}", written.display());
        return Ok(());
    }

    let shown = toml::to_string_pretty(&config.redacted())
        .map_err(|e| Error::config(format!("serializing config: {e}")))?;
    let state = if target.exists() { "" } else { " (not present, showing defaults)" };
    println!("# {}{}", target.display(), state);
    println!();
    print!("{shown}");
    Ok(())
}
