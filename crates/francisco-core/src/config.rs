use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ai::mistral::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::ai::{CompletionSettings, MistralClient};
use crate::error::{FranciscoError, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: Option<u64>,
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: None,
            bind: DEFAULT_BIND.to_string(),
        }
    }

    /// Read the config file, or defaults when there is none.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Environment values win over the file. `lookup` is injected so tests
    /// don't have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("MISTRAL_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty("FRANCISCO_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = non_empty("FRANCISCO_MODEL") {
            self.model = model;
        }
        if let Some(bind) = non_empty("FRANCISCO_BIND") {
            self.bind = bind;
        }
    }

    /// Build the completion client. Fails when no API key is configured.
    pub fn completion_client(&self) -> Result<MistralClient> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                FranciscoError::Config(
                    "no API key: set MISTRAL_API_KEY or api_key in the config file".to_string(),
                )
            })?;

        let client = MistralClient::with_base_url(&self.base_url, api_key).settings(
            CompletionSettings {
                model: self.model.clone(),
                temperature: self.temperature,
            },
        );

        match self.timeout_secs {
            Some(secs) => Ok(client.timeout(Duration::from_secs(secs))?),
            None => Ok(client),
        }
    }

    /// `<config dir>/francisco/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            FranciscoError::Config("could not determine config directory".to_string())
        })?;

        Ok(config_dir.join("francisco").join("config.json"))
    }
}
