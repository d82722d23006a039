use anyhow::Result;
use media_catalog_models::Format;
use std::path::{Path, PathBuf};

pub const BASE_PATH_ENV: &str = "REELSHELF_BASE_PATH";

/// Container base directory from `REELSHELF_BASE_PATH`, if set and present
pub fn container_base_path() -> Option<PathBuf> {
    existing_base(std::env::var_os(BASE_PATH_ENV).map(PathBuf::from))
}

fn existing_base(candidate: Option<PathBuf>) -> Option<PathBuf> {
    candidate.filter(|path| !path.as_os_str().is_empty() && path.is_dir())
}

#[derive(Debug, Clone)]
pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("reelshelf");

        Ok(Self::with_base(base_dir))
    }

    /// Lay everything out under a single directory (containers, tests)
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    /// Point the data directory somewhere else, keeping config and logs in place
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn source_file(&self, format: Format) -> PathBuf {
        self.data_dir.join(format!("source.{}", format.extension()))
    }

    pub fn watchlist_dir(&self) -> PathBuf {
        self.data_dir.join("watchlists")
    }

    /// Live file for a watchlist (always JSON, the startup scan only picks up `.json`)
    pub fn watchlist_file(&self, name: &str) -> PathBuf {
        self.watchlist_dir().join(format!("{}.json", name))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Relative log file names land in the log directory
    pub fn resolve_log_file(&self, file: &Path) -> PathBuf {
        if file.is_relative() {
            self.log_dir.join(file)
        } else {
            file.to_path_buf()
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        std::fs::create_dir_all(self.watchlist_dir())?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = container_base_path() {
            return Self::with_base(base);
        }

        // Platform paths (e.g., ~/.config/reelshelf on Linux)
        Self::new().unwrap_or_else(|_| Self::with_base(".reelshelf"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = PathManager::with_base("/tmp/reelshelf-test");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/reelshelf-test/config.toml"));
        assert_eq!(paths.source_file(Format::Json), PathBuf::from("/tmp/reelshelf-test/data/source.json"));
        assert_eq!(
            paths.watchlist_file("Favorites"),
            PathBuf::from("/tmp/reelshelf-test/data/watchlists/Favorites.json")
        );
    }

    #[test]
    fn test_data_dir_override() {
        let paths = PathManager::with_base("/cfg").with_data_dir("/srv/media");
        assert_eq!(paths.config_dir(), Path::new("/cfg"));
        assert_eq!(paths.watchlist_dir(), PathBuf::from("/srv/media/watchlists"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path());
        paths.ensure_directories().unwrap();
        assert!(paths.watchlist_dir().is_dir());
        assert!(paths.log_dir().is_dir());
    }

    #[test]
    fn test_container_base_needs_an_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(existing_base(Some(dir.path().to_path_buf())), Some(dir.path().to_path_buf()));
        assert_eq!(existing_base(Some(dir.path().join("missing"))), None);
        assert_eq!(existing_base(Some(PathBuf::new())), None);
        assert_eq!(existing_base(None), None);
    }

    #[test]
    fn test_resolve_log_file() {
        let paths = PathManager::with_base("/cfg");
        assert_eq!(paths.resolve_log_file(Path::new("reelshelf.log")), PathBuf::from("/cfg/logs/reelshelf.log"));
        assert_eq!(paths.resolve_log_file(Path::new("/var/log/r.log")), PathBuf::from("/var/log/r.log"));
    }
}
