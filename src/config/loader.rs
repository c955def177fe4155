use std::env;

use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

use crate::types::ConsoleError;

use super::{paths, Config};

const API_URL_ENV: &str = "SYNC_CONSOLE_API_URL";
const PAGE_SIZE_ENV: &str = "SYNC_CONSOLE_PAGE_SIZE";

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let config = match Self::try_load().await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };
        let config = config.with_env_overrides();
        info!(
            api = %config.api_base_url,
            page_size = config.page_size,
            "Loaded configuration"
        );
        config
    }

    async fn try_load() -> Result<Self, ConsoleError> {
        let config_path = paths::get_config_path()?;

        if !config_path.exists() {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .await
            .map_err(|err| ConsoleError::Config(format!("Failed to read config file: {err}")))?;

        Self::from_json(&contents)
    }

    pub(crate) fn from_json(contents: &str) -> Result<Self, ConsoleError> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|err| ConsoleError::Config(format!("Failed to parse config.json: {err}")))?;

        let mut config: Config = serde_json::from_value(value).map_err(|err| {
            ConsoleError::Config(format!("Failed to deserialize config.json: {err}"))
        })?;

        if config.page_size == 0 {
            warn!("page_size of 0 is not usable, falling back to default");
            config.page_size = Config::default().page_size;
        }

        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(custom) = env::var(API_URL_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                self.api_base_url = trimmed.to_string();
            }
        }
        if let Ok(raw) = env::var(PAGE_SIZE_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => self.page_size = size,
                _ => warn!(value = %raw, "Ignoring invalid {PAGE_SIZE_ENV}"),
            }
        }
        self
    }
}
