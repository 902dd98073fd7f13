use repeater_engine::{ContentTrust, Options};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read block template at {template_path}: {source}")]
    TemplateReadError {
        template_path: PathBuf,
        source: std::io::Error,
    },
}

fn default_handle_class() -> String {
    repeater_engine::reorder::DEFAULT_HANDLE_CLASS.to_string()
}

/// Everything the host supplies to a repeater field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub field_name: String,
    pub endpoint_url: String,
    pub template_path: PathBuf,
    #[serde(default)]
    pub content_trust: ContentTrust,
    #[serde(default = "default_handle_class")]
    pub handle_class: String,
    #[serde(default)]
    pub options: Options,
    /// Previously persisted value, sent as-is to the endpoint.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub value: serde_json::Value,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the template path
        config.template_path =
            Self::expand_path(&config.template_path).unwrap_or(config.template_path);

        Ok(Some(config))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/repeater");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Raw block template markup.
    pub fn load_template(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.template_path).map_err(|source| {
            ConfigError::TemplateReadError {
                template_path: self.template_path.clone(),
                source,
            }
        })
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
