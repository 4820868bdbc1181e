//! Catalog authorization command.

use std::io::Write;

use tokio::runtime::Runtime;

use crate::catalog::auth::{authorize_url, extract_code, save_token_cache, token_cache_path};
use crate::catalog::{AuthClient, CatalogError, TokenCache};
use crate::config::Config;
use crate::error::{Error, Result, ResultExt};

use super::AuthorizeArgs;

/// Run the authorization-code flow and cache the refresh token
pub fn cmd_authorize(rt: &Runtime, config: &Config, args: &AuthorizeArgs) -> Result<()> {
    let credentials = args.catalog.credentials(&config.catalog)?;

    let input = match &args.code {
        Some(code) => code.clone(),
        None => {
            println!("Open this URL in a browser and approve access:");
            println!();
            println!("  {}", authorize_url(&credentials, &config.catalog.scopes));
            println!();
            print!("Paste the URL you were redirected to: ");
            std::io::stdout().flush().with_context("writing prompt")?;

            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .with_context("reading authorization code")?;
            line
        }
    };
    let code = extract_code(&input)?;

    let auth = AuthClient::new(config.retry.request_timeout())?;
    let grant = rt.block_on(auth.exchange_code(&credentials, &code))?;
    let refresh_token = grant
        .refresh_token
        .ok_or_else(|| CatalogError::Auth("token endpoint returned no refresh token".to_string()))?;

    let path = token_cache_path().ok_or_else(|| Error::config("could not determine config directory"))?;
    save_token_cache(&path, &TokenCache::new(refresh_token, grant.scope))?;

    println!("✓ Authorized. Refresh token saved to {}", path.display());
    Ok(())
}
