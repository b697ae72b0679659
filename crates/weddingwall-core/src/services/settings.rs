//! Client configuration service
//!
//! Reads, saves and resets `client.json`.

use crate::models::ClientConfig;
use crate::paths::PathProvider;
use crate::utils::error::AppError;
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the configured backend URL.
pub const BACKEND_URL_ENV: &str = "WEDDINGWALL_BACKEND_URL";

/// Configuration file manager.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the provider's config location.
    pub fn new(provider: &dyn PathProvider) -> Result<Self, AppError> {
        Self::from_path(provider.config_path())
    }

    pub fn from_path(config_path: PathBuf) -> Result<Self, AppError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("cannot create config directory: {}", e)))?;
        }

        Ok(Self { config_path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load the stored configuration, or defaults when there is none.
    pub fn load(&self) -> Result<ClientConfig, AppError> {
        if !self.config_path.exists() {
            tracing::info!("No config file, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| AppError::Config(format!("cannot read config file: {}", e)))?;

        let config: ClientConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("invalid config file: {}", e)))?;

        tracing::info!("Loaded config: {:?}", self.config_path);
        Ok(config)
    }

    /// Load and apply environment overrides.
    pub fn load_effective(&self) -> Result<ClientConfig, AppError> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, std::env::var(BACKEND_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &ClientConfig) -> Result<(), AppError> {
        config.validate()?;

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| AppError::Config(format!("cannot serialize config: {}", e)))?;

        fs::write(&self.config_path, content)
            .map_err(|e| AppError::Config(format!("cannot write config file: {}", e)))?;

        tracing::info!("Saved config: {:?}", self.config_path);
        Ok(())
    }

    pub fn reset(&self) -> Result<ClientConfig, AppError> {
        let defaults = ClientConfig::default();
        self.save(&defaults)?;
        Ok(defaults)
    }
}

fn apply_env_overrides(config: &mut ClientConfig, backend_url: Option<String>) {
    if let Some(url) = backend_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
        tracing::debug!("Backend URL overridden by {}", BACKEND_URL_ENV);
        config.backend_url = url;
    }
}
