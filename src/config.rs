use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml;

use crate::provider::Provider;

pub const GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const OPENAI_MODEL: &str = "gpt-4";

/// Shown whenever a flow needs an API key and none is configured.
pub const NO_API_KEY_MSG: &str = "Please set your API key in the Settings tab first.";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub gemini_model: String,
    pub openai_model: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Self::builder(&get_user_config_path())?
            // Local codesplain.toml in CWD is an optional override.
            .add_source(File::with_name("codesplain").required(false))
            .build()?;
        s.try_deserialize()
    }

    /// Loads from a single file, skipping the CWD override layer.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::builder(path)?.build()?.try_deserialize()
    }

    fn builder(
        user_path: &Path,
    ) -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("provider", "gemini")?
            .set_default("gemini_model", GEMINI_MODEL)?
            .set_default("openai_model", OPENAI_MODEL)?
            .add_source(File::from(user_path.to_path_buf()).required(false)))
    }

    pub fn model_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Gemini => &self.gemini_model,
            Provider::OpenAi => &self.openai_model,
        }
    }
}

pub fn get_user_config_path() -> PathBuf {
    let mut path = dirs::home_dir().expect("Failed to get home directory");
    path.push(".config");
    path.push("codesplain");
    path.push("codesplain.toml");
    path
}

/// Writes the API key and provider into the config file, preserving any
/// other keys already present.
pub fn save_settings(path: &Path, api_key: &str, provider: Provider) -> Result<(), anyhow::Error> {
    let config_str = fs::read_to_string(path).unwrap_or_else(|_| "".to_string());
    let mut doc = config_str.parse::<toml::Table>()?;

    doc.insert("api_key".to_string(), toml::Value::String(api_key.to_string()));
    doc.insert(
        "provider".to_string(),
        toml::Value::String(provider.id().to_string()),
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;

    Ok(())
}
