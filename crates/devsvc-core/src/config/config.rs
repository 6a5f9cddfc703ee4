//! Configuration management for devsvc
//!
//! Configuration is stored in TOML format. Every key is optional; a missing
//! or empty file yields the built-in defaults.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use super::error::{ConfigError, Result};

/// Management endpoint used when nothing else is configured
pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.core.windows.net/";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the management endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_url: Option<String>,
    /// Directory holding the personal certificate store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_store: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Resolve the management endpoint, falling back to the public one
    pub fn management_url(&self) -> Result<Url> {
        let raw = self
            .management_url
            .as_deref()
            .unwrap_or(DEFAULT_MANAGEMENT_URL);
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            source: e,
        })
    }

    /// Resolve the certificate store directory
    ///
    /// Defaults to `<config dir>/certs/my`, the personal store of the
    /// current user.
    pub fn cert_store_path(&self) -> Result<PathBuf> {
        match &self.cert_store {
            Some(path) => Ok(path.clone()),
            None => {
                let config_path = Self::config_path()?;
                let dir = config_path.parent().ok_or(ConfigError::ConfigDirError)?;
                Ok(dir.join("certs").join("my"))
            }
        }
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/devsvc/config.toml` wins when that directory
    /// exists; otherwise the platform standard location is used.
    ///
    /// On Linux: ~/.config/devsvc/config.toml
    /// On Windows: %APPDATA%\devsvc\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_dir = base_dirs.home_dir().join(".config").join("devsvc");
                if linux_style_dir.exists() {
                    return Ok(linux_style_dir.join("config.toml"));
                }
            }
        }

        let proj_dirs = ProjectDirs::from("", "", "devsvc").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default}. Unset variables without a
    /// default are left as-is.
    ///
    /// Example:
    /// ```toml
    /// management_url = "${DEVSVC_MANAGEMENT_URL:-https://management.core.windows.net/}"
    /// cert_store = "${HOME}/.devsvc/certs"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            management_url: Some("https://management.example.test/".to_string()),
            cert_store: Some(PathBuf::from("/etc/devsvc/certs")),
        };

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_default_management_url() {
        let config = Config::default();
        let url = config.management_url().unwrap();
        assert_eq!(url.as_str(), DEFAULT_MANAGEMENT_URL);
    }

    #[test]
    fn test_invalid_management_url() {
        let config = Config {
            management_url: Some("not a url".to_string()),
            cert_store: None,
        };
        let err = config.management_url().unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_explicit_cert_store_wins() {
        let config = Config {
            management_url: None,
            cert_store: Some(PathBuf::from("/srv/certs")),
        };
        assert_eq!(config.cert_store_path().unwrap(), PathBuf::from("/srv/certs"));
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion() {
        unsafe {
            std::env::set_var("TEST_DEVSVC_HOST", "management.example.test");
        }

        let content = r#"
management_url = "https://${TEST_DEVSVC_HOST}/"
"#;

        let expanded = Config::expand_env_vars(content);
        assert!(expanded.contains("https://management.example.test/"));

        unsafe {
            std::env::remove_var("TEST_DEVSVC_HOST");
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion_with_defaults() {
        unsafe {
            std::env::remove_var("NONEXISTENT_DEVSVC_URL");
        }

        let content = r#"
management_url = "${NONEXISTENT_DEVSVC_URL:-https://management.core.windows.net/}"
"#;

        let expanded = Config::expand_env_vars(content);
        assert!(expanded.contains("https://management.core.windows.net/"));
    }

    #[test]
    #[serial_test::serial]
    fn test_unset_var_without_default_is_left_alone() {
        unsafe {
            std::env::remove_var("NONEXISTENT_DEVSVC_STORE");
        }

        let content = r#"cert_store = "${NONEXISTENT_DEVSVC_STORE}""#;
        let expanded = Config::expand_env_vars(content);
        assert_eq!(expanded, content);
    }
}
