use anyhow::Result;
use console::style;
use konspekt_core::{
    Provider,
    paths::{get_config_dir, get_credentials_path},
};

use super::load_credentials;
use crate::ui;

pub async fn run(provider: Provider, key: &str) -> Result<()> {
    provider.validate_api_key(key)?;

    let mut credentials = load_credentials().await?;
    credentials.set(provider, key.trim());

    let path = get_credentials_path(&get_config_dir());
    credentials.save(&path).await?;
    tracing::debug!(provider = provider.id(), path = %path.display(), "Stored API key");

    ui::ok(format!(
        "Saved {} key to {}",
        provider.name(),
        style(path.display()).cyan()
    ));
    Ok(())
}
