use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the findash home directory and an initial `config.json` that points at `sheet_url`.
///
/// # Errors
/// - Returns an error if `sheet_url` is not a usable sheet URL or if any file operations fail.
pub async fn init(findash_home: &Path, sheet_url: &str) -> Result<Out<()>> {
    let config = Config::create(findash_home, sheet_url)
        .await
        .context("Unable to create the findash directory and config")?;
    Ok(format!(
        "Successfully created the findash config at '{}'",
        config.config_path().display()
    )
    .into())
}
