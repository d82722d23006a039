pub mod config;
pub mod paths;

pub use config::{Config, FetchConfig, LoggingConfig, StorageConfig, DEFAULT_OMDB_URL};
pub use paths::{container_base_path, PathManager};
