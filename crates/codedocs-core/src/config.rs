//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (`--config`, `CODEDOCS_CONFIG`, or ~/.config/codedocs/config.toml)
//! 3. Environment variables (CODEDOCS_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::classify::Language;

/// Environment variable prefix
const ENV_PREFIX: &str = "CODEDOCS";

/// Default request timeout for the classification service
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the document is updated after a catalog change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Splice the changed entry into the existing document, keeping manual edits
    #[default]
    Splice,
    /// Rebuild the whole document from the catalog
    Regenerate,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Splice => f.write_str("splice"),
            Strategy::Regenerate => f.write_str("regenerate"),
        }
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "splice" => Ok(Strategy::Splice),
            "regenerate" => Ok(Strategy::Regenerate),
            _ => bail!("Invalid strategy '{}'. Use 'splice' or 'regenerate'.", s),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Project directory; relative file paths resolve against it
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Catalog file (JSON)
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,

    /// Rendered Markdown document
    #[serde(default = "default_document_file")]
    pub document_file: PathBuf,

    /// Document update strategy
    #[serde(default)]
    pub strategy: Strategy,

    /// Classification service endpoint (optional)
    #[serde(default)]
    pub classifier_url: Option<String>,

    /// Language requested from the classification service
    #[serde(default)]
    pub language: Language,

    /// Classification request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Log to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            catalog_file: default_catalog_file(),
            document_file: default_document_file(),
            strategy: Strategy::default(),
            classifier_url: None,
            language: Language::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // CODEDOCS_ROOT
        if let Ok(val) = std::env::var(format!("{}_ROOT", ENV_PREFIX)) {
            self.root = PathBuf::from(val);
        }

        // CODEDOCS_STRATEGY
        if let Ok(val) = std::env::var(format!("{}_STRATEGY", ENV_PREFIX)) {
            self.strategy = val.parse().context("Invalid CODEDOCS_STRATEGY")?;
        }

        // CODEDOCS_CLASSIFIER_URL
        if let Ok(val) = std::env::var(format!("{}_CLASSIFIER_URL", ENV_PREFIX)) {
            self.classifier_url = if val.is_empty() { None } else { Some(val) };
        }

        // CODEDOCS_LANGUAGE
        if let Ok(val) = std::env::var(format!("{}_LANGUAGE", ENV_PREFIX)) {
            self.language = val.parse().context("Invalid CODEDOCS_LANGUAGE")?;
        }

        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with CODEDOCS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codedocs")
            .join("config.toml")
    }

    /// Path to the catalog file
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.catalog_file)
    }

    /// Path to the Markdown document
    pub fn document_path(&self) -> PathBuf {
        self.root.join(&self.document_file)
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_catalog_file() -> PathBuf {
    PathBuf::from("functions.json")
}

fn default_document_file() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "CODEDOCS_ROOT",
        "CODEDOCS_STRATEGY",
        "CODEDOCS_CLASSIFIER_URL",
        "CODEDOCS_LANGUAGE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.strategy, Strategy::Splice);
        assert!(config.classifier_url.is_none());
        assert_eq!(config.language, Language::En);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            root: PathBuf::from("/project"),
            ..Config::default()
        };

        assert_eq!(config.catalog_path(), PathBuf::from("/project/functions.json"));
        assert_eq!(config.document_path(), PathBuf::from("/project/README.md"));
    }

    #[test]
    fn test_absolute_file_ignores_root() {
        let config = Config {
            root: PathBuf::from("/project"),
            document_file: PathBuf::from("/docs/API.md"),
            ..Config::default()
        };
        assert_eq!(config.document_path(), PathBuf::from("/docs/API.md"));
    }

    #[test]
    fn test_env_override_root() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("CODEDOCS_ROOT", "/tmp/codedocs-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.root, PathBuf::from("/tmp/codedocs-test"));
    }

    #[test]
    fn test_env_override_strategy() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("CODEDOCS_STRATEGY", "Regenerate");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.strategy, Strategy::Regenerate);

        env::set_var("CODEDOCS_STRATEGY", "sometimes");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_env_override_classifier_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("CODEDOCS_CLASSIFIER_URL", "http://localhost:8080/rpc");
        config.apply_env_overrides().unwrap();
        assert_eq!(
            config.classifier_url,
            Some("http://localhost:8080/rpc".to_string())
        );

        // Empty string clears it
        env::set_var("CODEDOCS_CLASSIFIER_URL", "");
        config.apply_env_overrides().unwrap();
        assert!(config.classifier_url.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            root: PathBuf::from("/project"),
            strategy: Strategy::Regenerate,
            classifier_url: Some("https://classifier.example.com".to_string()),
            language: Language::Ro,
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("strategy = \"regenerate\""));
        assert!(toml_str.contains("language = \"Ro\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            root = "/custom"
            document_file = "docs/API.md"
            strategy = "regenerate"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.document_path(), PathBuf::from("/custom/docs/API.md"));
        assert_eq!(config.catalog_path(), PathBuf::from("/custom/functions.json"));
        assert_eq!(config.strategy, Strategy::Regenerate);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            request_timeout_secs: 5,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded.request_timeout_secs, 5);
    }
}
