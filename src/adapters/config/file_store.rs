use crate::{
    domain::ProjectId,
    ports::{AppConfig, ConfigError, ConfigResult, ConfigStore, DEFAULT_API_BASE_URL},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

pub const TOKEN_ENV: &str = "BLUEBOTTLE_TOKEN";
pub const API_URL_ENV: &str = "BLUEBOTTLE_API_URL";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    api_base_url: Option<String>,
    default_project: Option<String>,
    cache_ttl_seconds: Option<u64>,
}

/// `config.json` under the platform config directory; the API token lives in
/// the OS keyring, or in a `.token` file next to the config when no keyring
/// is available.
pub struct FileConfigStore {
    config_path: PathBuf,
    keyring_service: Option<String>,
}

impl FileConfigStore {
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ReadError("Cannot determine config directory".to_string())
        })?;

        Ok(Self {
            config_path: config_dir.join("bluebottle-tasks").join("config.json"),
            keyring_service: Some("bluebottle-tasks".to_string()),
        })
    }

    /// A store rooted at `config_path` that keeps the token in a file only.
    pub fn without_keyring(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            keyring_service: None,
        }
    }

    async fn ensure_config_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        Ok(())
    }

    fn token_file_path(&self) -> PathBuf {
        self.config_path.with_file_name(".token")
    }

    async fn get_token_from_file(&self) -> ConfigResult<Option<String>> {
        match fs::read_to_string(self.token_file_path()).await {
            Ok(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Ok(None),
        }
    }

    async fn set_token_in_file(&self, token: &str) -> ConfigResult<()> {
        self.ensure_config_dir().await?;
        let token_path = self.token_file_path();
        fs::write(&token_path, token)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&token_path)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&token_path, perms)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_config(&self) -> ConfigResult<AppConfig> {
        let config_file = match fs::read_to_string(&self.config_path).await {
            Ok(content) => serde_json::from_str::<ConfigFile>(&content)
                .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?,
            Err(_) => ConfigFile::default(),
        };

        let mut api_token = self.get_api_token().await?;
        if api_token.is_none() {
            api_token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }

        let api_base_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or(config_file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(AppConfig {
            api_token,
            api_base_url,
            default_project: config_file.default_project.map(ProjectId),
            cache_ttl_seconds: config_file.cache_ttl_seconds.unwrap_or(300),
        })
    }

    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_config_dir().await?;

        let config_file = ConfigFile {
            api_base_url: Some(config.api_base_url.clone()),
            default_project: config.default_project.as_ref().map(|p| p.0.clone()),
            cache_ttl_seconds: Some(config.cache_ttl_seconds),
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        if let Some(token) = &config.api_token {
            self.set_api_token(token).await?;
        }

        Ok(())
    }

    async fn get_api_token(&self) -> ConfigResult<Option<String>> {
        if let Some(service) = &self.keyring_service {
            match keyring::Entry::new(service, "api_token") {
                Ok(entry) => match entry.get_password() {
                    Ok(token) => return Ok(Some(token)),
                    Err(keyring::Error::NoEntry) => {}
                    Err(_) => {
                        tracing::warn!("Keyring not available, falling back to file storage");
                    }
                },
                Err(_) => {
                    tracing::warn!("Keyring service not available, falling back to file storage");
                }
            }
        }

        self.get_token_from_file().await
    }

    async fn set_api_token(&self, token: &str) -> ConfigResult<()> {
        if let Some(service) = &self.keyring_service {
            match keyring::Entry::new(service, "api_token") {
                Ok(entry) => match entry.set_password(token) {
                    Ok(()) => return Ok(()),
                    Err(_) => {
                        tracing::warn!("Failed to store in keyring, falling back to file storage");
                    }
                },
                Err(_) => {
                    tracing::warn!("Keyring not available, using file storage");
                }
            }
        }

        self.set_token_in_file(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("bluebottle-tasks-{}-{}", name, std::process::id()))
            .join("config.json")
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = FileConfigStore::without_keyring(scratch_path("roundtrip"));
        let config = AppConfig {
            api_token: Some("secret".to_string()),
            api_base_url: "https://tasks.example.org/api".to_string(),
            default_project: Some(ProjectId::from("wells")),
            cache_ttl_seconds: 60,
        };

        store.save_config(&config).await.unwrap();
        let loaded = store.load_config().await.unwrap();

        assert_eq!(loaded.api_token.as_deref(), Some("secret"));
        assert_eq!(loaded.default_project, Some(ProjectId::from("wells")));
        assert_eq!(loaded.cache_ttl_seconds, 60);
    }

    #[tokio::test]
    async fn invalid_file_is_reported() {
        let path = scratch_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, "{ not json").await.unwrap();

        let store = FileConfigStore::without_keyring(path);
        assert!(matches!(
            store.load_config().await,
            Err(ConfigError::InvalidFormat(_))
        ));
    }
}
