use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` pointing at `base_url`.
///
/// # Arguments
/// - `expenses_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/expenses`
/// - `base_url` - The base URL of the expense service, e.g. `http://localhost:3000`
///
/// # Errors
/// - Returns an error if `base_url` is not an http(s) URL or if any file operations fail.
pub async fn init(expenses_home: &Path, base_url: &str) -> Result<Out<()>> {
    let config = Config::create(expenses_home, base_url)
        .await
        .context("Unable to create the data directory and config")?;
    Ok(format!(
        "Successfully created {} for the service at {}",
        config.config_path().display(),
        config.base_url()
    )
    .into())
}
