use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LANGUAGES: &str = "en,ru";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub default_languages: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from ~/.config/yt-transcript-mcp/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Load an explicitly named config file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content =
            std::fs::read_to_string(path).wrap_err_with(|| format!("reading config {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).wrap_err_with(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn default_languages(&self) -> &str {
        self.default_languages.as_deref().unwrap_or(DEFAULT_LANGUAGES)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("yt-transcript-mcp")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
host = "127.0.0.1"
port = 9000
default_languages = "de,en"
request_timeout_secs = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.port(), 9000);
        assert_eq!(config.default_languages(), "de,en");
        assert_eq!(config.request_timeout_secs(), 5);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.host(), DEFAULT_HOST);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.default_languages(), DEFAULT_LANGUAGES);
        assert_eq!(config.request_timeout_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"port = 8080"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.port(), 8080);
        assert!(config.host.is_none());
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("yt-transcript-mcp-no-such-config.toml");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("yt-transcript-mcp-config-{}.toml", std::process::id()));
        std::fs::write(&path, "default_languages = \"uk\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.default_languages(), "uk");
    }
}
