use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{error::Result, provider::Provider};

/// Stored API keys, one per provider id:
///
/// ```toml
/// gemini = "AIza..."
/// openai = "sk-..."
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials {
    keys: BTreeMap<String, String>,
}

impl Credentials {
    pub fn get(&self, provider: Provider) -> Option<&str> {
        self.keys
            .get(provider.id())
            .map(String::as_str)
            .filter(|k| !k.trim().is_empty())
    }

    pub fn set(&mut self, provider: Provider, key: impl Into<String>) {
        self.keys.insert(provider.id().to_string(), key.into());
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Loads the file, treating a missing file as no stored credentials.
    pub async fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, toml::to_string(self)?).await?;
        restrict_permissions(path).await?;
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
