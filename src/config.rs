use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing key material: rsa.{0} is empty")]
    MissingKey(&'static str),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL. Without it the service runs on the in-memory store.
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub rsa: RsaConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// PEM-encoded RS256 signing material.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct RsaConfig {
    #[serde(default)]
    pub private: String,
    #[serde(default)]
    pub public: String,
}

// Keeps the private key out of `{:?}` output.
impl std::fmt::Debug for RsaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaConfig")
            .field("private", &"<redacted>")
            .field("public_len", &self.public.len())
            .finish()
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: config_path,
                source,
            },
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: "<inline>".to_string(),
                source,
            })?;
        config.rsa.ensure_present()?;
        Ok(config)
    }
}

impl RsaConfig {
    fn ensure_present(&self) -> Result<(), ConfigError> {
        if self.private.trim().is_empty() {
            return Err(ConfigError::MissingKey("private"));
        }
        if self.public.trim().is_empty() {
            return Err(ConfigError::MissingKey("public"));
        }
        Ok(())
    }
}
