use crate::paths::PathManager;
use media_catalog_models::Format;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Format of the source catalog file
    #[serde(default)]
    pub source_format: Format,
    /// When set, deleted watchlists are written here before their live file is removed
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// OMDb API key; `OMDB_API_KEY` takes over when this is empty
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Relative paths are placed in the log directory
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_OMDB_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_results() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            source_format: Format::Json,
            archive_dir: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl FetchConfig {
    /// Configured key, falling back to the `OMDB_API_KEY` environment variable
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() && self.api_key != "YOUR_API_KEY" {
            return Some(self.api_key.clone());
        }
        std::env::var("OMDB_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the config file if present, otherwise start from defaults
    pub fn load_or_default(path_manager: &PathManager) -> anyhow::Result<Self> {
        let path = path_manager.config_file();
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.storage.source_format.is_readable() {
            return Err(anyhow::anyhow!(
                "source_format '{}' is write-only and cannot hold the catalog",
                self.storage.source_format
            ));
        }

        if self.fetch.enabled {
            if self.fetch.timeout_secs == 0 {
                return Err(anyhow::anyhow!("fetch.timeout_secs must be greater than zero"));
            }
            if self.fetch.max_results == 0 {
                return Err(anyhow::anyhow!("fetch.max_results must be greater than zero"));
            }
            if !self.fetch.base_url.starts_with("http://") && !self.fetch.base_url.starts_with("https://") {
                return Err(anyhow::anyhow!("fetch.base_url must be an http(s) URL: {}", self.fetch.base_url));
            }
        }

        Ok(())
    }

    pub fn is_fetch_configured(&self) -> bool {
        self.fetch.enabled && self.fetch.resolved_api_key().is_some()
    }

    /// Paths with the configured data directory override applied
    pub fn paths(&self, base: PathManager) -> PathManager {
        match &self.storage.data_dir {
            Some(dir) => base.with_data_dir(dir.clone()),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            storage: StorageConfig {
                data_dir: Some(PathBuf::from("/srv/reelshelf")),
                source_format: Format::Xml,
                archive_dir: None,
            },
            fetch: FetchConfig {
                api_key: "abc123".to_string(),
                timeout_secs: 5,
                ..FetchConfig::default()
            },
            logging: LoggingConfig::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.storage.source_format, Format::Xml);
        assert_eq!(loaded.storage.data_dir, Some(PathBuf::from("/srv/reelshelf")));
        assert_eq!(loaded.fetch.api_key, "abc123");
        assert_eq!(loaded.fetch.timeout_secs, 5);
        assert_eq!(loaded.fetch.base_url, DEFAULT_OMDB_URL);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.storage.source_format, Format::Json);
        assert!(config.fetch.enabled);
        assert_eq!(config.fetch.max_results, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        config.storage.source_format = Format::Pretty;
        assert!(config.validate().is_err());

        config.storage.source_format = Format::Csv;
        config.fetch.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.fetch.enabled = false;
        assert!(config.validate().is_ok());
        assert!(!config.is_fetch_configured());
    }

    #[test]
    fn test_paths_apply_data_dir_override() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/media"));
        let paths = config.paths(PathManager::with_base("/cfg"));
        assert_eq!(paths.watchlist_dir(), PathBuf::from("/srv/media/watchlists"));
    }
}
