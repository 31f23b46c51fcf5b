use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const DEFAULT_PARALLEL_DIAGRAMS: usize = 4;
const DEFAULT_MAX_DIAGRAMS: usize = 8;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Resolved runtime settings: config file values overridden by environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub max_parallel_diagrams: usize,
    pub max_diagrams: usize,
    pub request_timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_key: Option<String>,
    text_model: Option<String>,
    image_model: Option<String>,
    max_parallel_diagrams: Option<usize>,
    max_diagrams: Option<usize>,
    request_timeout_secs: Option<u64>,
}

/// Root data directory. `~/.patentpen`, overridable with PATENTPEN_DATA_DIR.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PATENTPEN_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".patentpen"))
        .unwrap_or_else(|| PathBuf::from(".patentpen"))
}

impl Settings {
    pub fn load() -> Result<Self> {
        let path = data_dir().join("config.toml");
        let file = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("Invalid config at {}", path.display()))?
        } else {
            ConfigFile::default()
        };
        Self::resolve(file, std::env::var("GEMINI_API_KEY").ok())
    }

    fn resolve(file: ConfigFile, env_api_key: Option<String>) -> Result<Self> {
        let api_key = env_api_key
            .filter(|k| !k.is_empty())
            .or(file.api_key)
            .ok_or_else(|| {
                anyhow!("No API key configured. Set GEMINI_API_KEY or add api_key to config.toml.")
            })?;

        Ok(Self {
            api_key,
            text_model: file.text_model.unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: file
                .image_model
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            max_parallel_diagrams: file
                .max_parallel_diagrams
                .unwrap_or(DEFAULT_PARALLEL_DIAGRAMS)
                .max(1),
            max_diagrams: file.max_diagrams.unwrap_or(DEFAULT_MAX_DIAGRAMS).max(1),
            request_timeout: Duration::from_secs(
                file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_wins_over_config_file() {
        let file: ConfigFile = toml::from_str("api_key = \"from-file\"").unwrap();
        let settings = Settings::resolve(file, Some("from-env".to_string())).unwrap();
        assert_eq!(settings.api_key, "from-env");
    }

    #[test]
    fn missing_api_key_is_an_error() {
        assert!(Settings::resolve(ConfigFile::default(), None).is_err());
        assert!(Settings::resolve(ConfigFile::default(), Some(String::new())).is_err());
    }

    #[test]
    fn defaults_apply_when_file_is_sparse() {
        let file: ConfigFile = toml::from_str("api_key = \"k\"").unwrap();
        let settings = Settings::resolve(file, None).unwrap();
        assert_eq!(settings.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(settings.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(settings.max_parallel_diagrams, 4);
        assert_eq!(settings.max_diagrams, 8);
        assert_eq!(settings.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn file_overrides_are_honored() {
        let raw = "api_key = \"k\"\ntext_model = \"gemini-2.5-pro\"\nmax_parallel_diagrams = 2\nrequest_timeout_secs = 30";
        let file: ConfigFile = toml::from_str(raw).unwrap();
        let settings = Settings::resolve(file, None).unwrap();
        assert_eq!(settings.text_model, "gemini-2.5-pro");
        assert_eq!(settings.max_parallel_diagrams, 2);
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
    }
}
