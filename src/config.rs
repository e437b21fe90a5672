use crate::classifier::ClassificationPolicy;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub measurements: MeasurementsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// How resource types missing from the billing table are treated
    #[serde(default)]
    pub policy: ClassificationPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementsConfig {
    /// `test_approach` values whose rows get a computed cost
    #[serde(default = "default_dynamic_approaches")]
    pub dynamic_approaches: Vec<String>,
}

fn default_dynamic_approaches() -> Vec<String> {
    vec!["5".to_string(), "6".to_string()]
}

impl Default for MeasurementsConfig {
    fn default() -> Self {
        Self {
            dynamic_approaches: default_dynamic_approaches(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .testcost.toml in current dir, then ~/.config/testcost/config.toml
            let local = PathBuf::from(".testcost.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("testcost").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".testcost.toml"))
            }
        };

        if config_path.exists() {
            debug!("Loading config from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                ConfigError::ParseError(format!("{}: {}", config_path.display(), e))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            // Use defaults but warn if user explicitly provided a path
            if path.is_some() {
                warn!(
                    "Config file not found: {}, using default configuration",
                    config_path.display()
                );
            }
            Ok(Config::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.measurements.dynamic_approaches.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "measurements.dynamic_approaches".to_string(),
                reason: "at least one test approach must be listed".to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
